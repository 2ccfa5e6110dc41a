use crate::backend::MetricsBackend;
use crate::composite::CompositeMetric;
use crate::error::{Result, SliError};

/// A named ratio of good events to total events over a trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct SliDefinition {
    name: String,
    numerator: CompositeMetric,
    denominator: CompositeMetric,
    window_days: u32,
}

impl SliDefinition {
    pub fn new(
        name: impl Into<String>,
        numerator: CompositeMetric,
        denominator: CompositeMetric,
        window_days: u32,
    ) -> Self {
        Self {
            name: name.into(),
            numerator,
            denominator,
            window_days,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn numerator(&self) -> &CompositeMetric {
        &self.numerator
    }

    pub fn denominator(&self) -> &CompositeMetric {
        &self.denominator
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// `numerator / denominator`, unclamped. The numerator is fetched first.
    pub async fn ratio<B>(&self, backend: &B) -> Result<f64>
    where
        B: MetricsBackend + ?Sized,
    {
        let numerator = self.numerator.sum(backend).await?;
        let denominator = self.denominator.sum(backend).await?;

        if denominator == 0.0 {
            return Err(SliError::DivisionByZero { numerator });
        }
        Ok(numerator / denominator)
    }
}

/// SLI definitions keyed by name, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliSet {
    definitions: Vec<SliDefinition>,
}

impl SliSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `definition`, replacing (in place) any definition with the same name.
    pub fn insert(&mut self, definition: SliDefinition) -> Option<SliDefinition> {
        match self
            .definitions
            .iter_mut()
            .find(|existing| existing.name == definition.name)
        {
            Some(existing) => Some(std::mem::replace(existing, definition)),
            None => {
                self.definitions.push(definition);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SliDefinition> {
        self.definitions.iter().find(|definition| definition.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SliDefinition> {
        self.definitions.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|definition| definition.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<SliDefinition> for SliSet {
    fn from_iter<I: IntoIterator<Item = SliDefinition>>(iter: I) -> Self {
        let mut set = SliSet::new();
        for definition in iter {
            set.insert(definition);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SliSet {
    type Item = &'a SliDefinition;
    type IntoIter = std::slice::Iter<'a, SliDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
