use crate::domain::model::{FormField, VehicleQuery};
use crate::utils::error::{CarPredictError, Result};
use std::collections::BTreeMap;

/// Mutable state behind the prediction form.
///
/// Values are stored exactly as entered. Nothing is validated here; the
/// estimator decides what it can work with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<FormField, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        tracing::trace!(field = %field, value = %value, "form field updated");
        self.values.insert(field, value);
    }

    /// String-keyed variant of [`FormState::set_field`] for callers that only have a field name.
    pub fn set_field_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = name
            .parse::<FormField>()
            .map_err(|name| CarPredictError::InvalidField { name })?;
        self.set_field(field, value);
        Ok(())
    }

    /// Replace every field with [`VehicleQuery::sample`].
    pub fn load_sample(&mut self) {
        let sample = VehicleQuery::sample();
        self.values = FormField::ALL
            .into_iter()
            .filter_map(|field| sample.get(field).map(|v| (field, v.to_string())))
            .collect();
        tracing::debug!("form loaded with sample vehicle");
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Current input text; empty when the field was never set.
    pub fn value(&self, field: FormField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (FormField, &str)> + '_ {
        FormField::ALL.into_iter().map(move |field| (field, self.value(field)))
    }

    /// Owned copy of the form for an estimation call. Blank inputs become `None`.
    pub fn snapshot(&self) -> VehicleQuery {
        let mut query = VehicleQuery::default();
        for (field, value) in &self.values {
            if !value.is_empty() {
                *query.slot_mut(*field) = Some(value.clone());
            }
        }
        query
    }
}
