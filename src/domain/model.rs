use crate::utils::error::EstimatorFailure;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of model years offered by the year selector.
pub const YEAR_SPAN: i32 = 25;

/// One of the nine inputs on the prediction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Make,
    Model,
    Year,
    Mileage,
    FuelType,
    Transmission,
    BodyType,
    EngineSize,
    Horsepower,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        FormField::Make,
        FormField::Model,
        FormField::Year,
        FormField::Mileage,
        FormField::FuelType,
        FormField::Transmission,
        FormField::BodyType,
        FormField::EngineSize,
        FormField::Horsepower,
    ];

    /// Key used in payloads and by string-keyed callers.
    pub fn key(self) -> &'static str {
        match self {
            FormField::Make => "make",
            FormField::Model => "model",
            FormField::Year => "year",
            FormField::Mileage => "mileage",
            FormField::FuelType => "fuelType",
            FormField::Transmission => "transmission",
            FormField::BodyType => "bodyType",
            FormField::EngineSize => "engineSize",
            FormField::Horsepower => "horsepower",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Make => "Make",
            FormField::Model => "Model",
            FormField::Year => "Year",
            FormField::Mileage => "Mileage",
            FormField::FuelType => "Fuel Type",
            FormField::Transmission => "Transmission",
            FormField::BodyType => "Body Type",
            FormField::EngineSize => "Engine Size (L)",
            FormField::Horsepower => "Horsepower",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::Make => "Select make",
            FormField::Model => "e.g., Camry",
            FormField::Year => "Select year",
            FormField::Mileage => "e.g., 45000",
            FormField::FuelType => "Select fuel type",
            FormField::Transmission => "Select transmission",
            FormField::BodyType => "Select body type",
            FormField::EngineSize => "e.g., 2.5",
            FormField::Horsepower => "e.g., 203",
        }
    }

    /// Allowed values for select-style inputs; `None` for free text.
    pub fn options(self) -> Option<Vec<String>> {
        fn names<T: fmt::Display>(all: &[T]) -> Vec<String> {
            all.iter().map(ToString::to_string).collect()
        }

        match self {
            FormField::Make => Some(names(Make::ALL)),
            FormField::Year => Some(year_options().iter().map(ToString::to_string).collect()),
            FormField::FuelType => Some(names(FuelType::ALL)),
            FormField::Transmission => Some(names(Transmission::ALL)),
            FormField::BodyType => Some(names(BodyType::ALL)),
            _ => None,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FormField {
    type Err = String;

    /// Accepts the payload keys and their snake_case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.trim().chars().filter(|c| *c != '_' && *c != '-').collect();
        FormField::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| s.to_string())
    }
}

macro_rules! catalog {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("'{}' is not one of {}", s, allowed.join(", "))
                    })
            }
        }
    };
}

catalog!(
    /// Manufacturers the form offers.
    Make {
        Toyota => "Toyota",
        Honda => "Honda",
        Bmw => "BMW",
        Mercedes => "Mercedes",
        Audi => "Audi",
        Ford => "Ford",
        Chevrolet => "Chevrolet",
    }
);

catalog!(FuelType {
    Gasoline => "Gasoline",
    Diesel => "Diesel",
    Hybrid => "Hybrid",
    Electric => "Electric",
});

catalog!(Transmission {
    Automatic => "Automatic",
    Manual => "Manual",
    Cvt => "CVT",
});

catalog!(BodyType {
    Sedan => "Sedan",
    Suv => "SUV",
    Hatchback => "Hatchback",
    Coupe => "Coupe",
    Truck => "Truck",
});

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Selectable model years, newest first.
pub fn year_options() -> Vec<i32> {
    let newest = current_year();
    (0..YEAR_SPAN).map(|offset| newest - offset).collect()
}

/// Raw snapshot of the form, handed to an estimator.
///
/// Values are kept as typed by the user; `None` means the input was blank.
/// Interpretation happens in [`VehicleQuery::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleQuery {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub mileage: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub engine_size: Option<String>,
    pub horsepower: Option<String>,
}

impl VehicleQuery {
    /// The demo vehicle behind "Try Sample Data".
    pub fn sample() -> Self {
        Self {
            make: Some("Toyota".to_string()),
            model: Some("Camry".to_string()),
            year: Some("2018".to_string()),
            mileage: Some("45000".to_string()),
            fuel_type: Some("Gasoline".to_string()),
            transmission: Some("Automatic".to_string()),
            body_type: Some("Sedan".to_string()),
            engine_size: Some("2.5".to_string()),
            horsepower: Some("203".to_string()),
        }
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        let value = match field {
            FormField::Make => &self.make,
            FormField::Model => &self.model,
            FormField::Year => &self.year,
            FormField::Mileage => &self.mileage,
            FormField::FuelType => &self.fuel_type,
            FormField::Transmission => &self.transmission,
            FormField::BodyType => &self.body_type,
            FormField::EngineSize => &self.engine_size,
            FormField::Horsepower => &self.horsepower,
        };
        value.as_deref()
    }

    pub(crate) fn slot_mut(&mut self, field: FormField) -> &mut Option<String> {
        match field {
            FormField::Make => &mut self.make,
            FormField::Model => &mut self.model,
            FormField::Year => &mut self.year,
            FormField::Mileage => &mut self.mileage,
            FormField::FuelType => &mut self.fuel_type,
            FormField::Transmission => &mut self.transmission,
            FormField::BodyType => &mut self.body_type,
            FormField::EngineSize => &mut self.engine_size,
            FormField::Horsepower => &mut self.horsepower,
        }
    }

    /// Interpret the raw values, reporting the first field that does not make sense.
    pub fn parse(&self) -> Result<VehicleSpec, EstimatorFailure> {
        Ok(VehicleSpec {
            make: self.parse_field(FormField::Make, |s| s.parse::<Make>())?,
            model: self.get(FormField::Model).map(|s| s.trim().to_string()),
            year: self.parse_field(FormField::Year, parse_year)?,
            mileage: self.parse_field(FormField::Mileage, |s| parse_count(s, "miles"))?,
            fuel_type: self.parse_field(FormField::FuelType, |s| s.parse::<FuelType>())?,
            transmission: self.parse_field(FormField::Transmission, |s| s.parse::<Transmission>())?,
            body_type: self.parse_field(FormField::BodyType, |s| s.parse::<BodyType>())?,
            engine_size: self.parse_field(FormField::EngineSize, parse_litres)?,
            horsepower: self.parse_field(FormField::Horsepower, |s| parse_count(s, "horsepower"))?,
        })
    }

    fn parse_field<T>(
        &self,
        field: FormField,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<Option<T>, EstimatorFailure> {
        match self.get(field).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse(raw)
                .map(Some)
                .map_err(|reason| EstimatorFailure::invalid_query(field.key(), reason)),
        }
    }
}

fn parse_year(raw: &str) -> Result<i32, String> {
    let year: i32 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a year", raw))?;
    let newest = current_year();
    let oldest = newest - (YEAR_SPAN - 1);
    if year < oldest || year > newest {
        return Err(format!("year must be between {} and {}", oldest, newest));
    }
    Ok(year)
}

fn parse_count(raw: &str, unit: &str) -> Result<u32, String> {
    raw.replace(',', "")
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not a whole, non-negative number of {}", raw, unit))
}

fn parse_litres(raw: &str) -> Result<f64, String> {
    let litres: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number of litres", raw))?;
    if !litres.is_finite() || litres < 0.0 {
        return Err("engine size must be a non-negative number".to_string());
    }
    // One decimal place is all the form promises.
    Ok((litres * 10.0).round() / 10.0)
}

/// Typed reading of a [`VehicleQuery`], as sent to real estimation services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSpec {
    pub make: Option<Make>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<u32>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub body_type: Option<BodyType>,
    pub engine_size: Option<f64>,
    pub horsepower: Option<u32>,
}

/// A successful price estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Estimate {
    pub fn new(price: f64) -> Result<Self, EstimatorFailure> {
        Self {
            price,
            currency: default_currency(),
            confidence: None,
            model: None,
        }
        .checked()
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Rejects estimates no caller should ever render.
    pub fn checked(self) -> Result<Self, EstimatorFailure> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(EstimatorFailure::malformed(format!(
                "price must be a non-negative number, got {}",
                self.price
            )));
        }
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(EstimatorFailure::malformed(format!(
                    "confidence must be within [0, 1], got {}",
                    confidence
                )));
            }
        }
        Ok(self)
    }

    /// Price rounded to whole units with thousands separators, e.g. `$21,500`.
    pub fn display_price(&self) -> String {
        let whole = self.price.round() as u64;
        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        match self.currency.as_str() {
            "USD" => format!("${}", grouped),
            other => format!("{} {}", grouped, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_parses_cleanly() {
        if current_year() - (YEAR_SPAN - 1) > 2018 {
            // The sample year has aged out of the selector.
            assert!(VehicleQuery::sample().parse().is_err());
            return;
        }

        let spec = VehicleQuery::sample().parse().unwrap();
        assert_eq!(spec.make, Some(Make::Toyota));
        assert_eq!(spec.model.as_deref(), Some("Camry"));
        assert_eq!(spec.year, Some(2018));
        assert_eq!(spec.mileage, Some(45000));
        assert_eq!(spec.fuel_type, Some(FuelType::Gasoline));
        assert_eq!(spec.transmission, Some(Transmission::Automatic));
        assert_eq!(spec.body_type, Some(BodyType::Sedan));
        assert_eq!(spec.engine_size, Some(2.5));
        assert_eq!(spec.horsepower, Some(203));
    }

    #[test]
    fn test_blank_query_parses_to_all_absent() {
        let query = VehicleQuery {
            model: Some("   ".to_string()),
            ..Default::default()
        };
        let spec = query.parse().unwrap();
        assert_eq!(spec.make, None);
        assert_eq!(spec.year, None);
        assert_eq!(spec.horsepower, None);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        let cases = [
            (FormField::Make, "Lada"),
            (FormField::Mileage, "-5"),
            (FormField::Mileage, "lots"),
            (FormField::EngineSize, "-1.0"),
            (FormField::Horsepower, "2.5"),
            (FormField::FuelType, "Steam"),
        ];

        for (field, raw) in cases {
            let mut query = VehicleQuery::default();
            *query.slot_mut(field) = Some(raw.to_string());
            match query.parse() {
                Err(EstimatorFailure::InvalidQuery { field: name, .. }) => {
                    assert_eq!(name, field.key())
                }
                other => panic!("expected invalid {} for {:?}, got {:?}", field, raw, other),
            }
        }
    }

    #[test]
    fn test_year_window() {
        let newest = current_year();
        assert_eq!(parse_year(&newest.to_string()), Ok(newest));
        assert_eq!(parse_year(&(newest - 24).to_string()), Ok(newest - 24));
        assert!(parse_year(&(newest - 25).to_string()).is_err());
        assert!(parse_year(&(newest + 1).to_string()).is_err());

        let options = year_options();
        assert_eq!(options.len(), 25);
        assert_eq!(options[0], newest);
    }

    #[test]
    fn test_catalog_lookup_is_case_insensitive() {
        assert_eq!("bmw".parse::<Make>(), Ok(Make::Bmw));
        assert_eq!("cvt".parse::<Transmission>(), Ok(Transmission::Cvt));
        assert_eq!(BodyType::Suv.to_string(), "SUV");
        assert_eq!(Make::ALL.len(), 7);
    }

    #[test]
    fn test_form_field_names() {
        assert_eq!("fuelType".parse::<FormField>(), Ok(FormField::FuelType));
        assert_eq!("fuel_type".parse::<FormField>(), Ok(FormField::FuelType));
        assert_eq!("engine-size".parse::<FormField>(), Ok(FormField::EngineSize));
        assert!("color".parse::<FormField>().is_err());
        assert_eq!(FormField::EngineSize.label(), "Engine Size (L)");
        assert!(FormField::Model.options().is_none());
        assert_eq!(FormField::Transmission.options().unwrap().len(), 3);
    }

    #[test]
    fn test_estimate_checks() {
        assert!(Estimate::new(21500.0).is_ok());
        assert!(Estimate::new(-1.0).is_err());
        assert!(Estimate::new(f64::NAN).is_err());
        assert!(Estimate::new(100.0).unwrap().with_confidence(1.5).checked().is_err());
    }

    #[test]
    fn test_display_price() {
        assert_eq!(Estimate::new(21500.0).unwrap().display_price(), "$21,500");
        assert_eq!(Estimate::new(999.4).unwrap().display_price(), "$999");
        assert_eq!(Estimate::new(1234567.0).unwrap().display_price(), "$1,234,567");

        let mut eur = Estimate::new(15000.0).unwrap();
        eur.currency = "EUR".to_string();
        assert_eq!(eur.display_price(), "15,000 EUR");
    }

    #[test]
    fn test_spec_serializes_camel_case() {
        let spec = VehicleSpec {
            make: Some(Make::Bmw),
            model: None,
            year: None,
            mileage: None,
            fuel_type: Some(FuelType::Hybrid),
            transmission: None,
            body_type: Some(BodyType::Suv),
            engine_size: None,
            horsepower: None,
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["make"], "BMW");
        assert_eq!(json["fuelType"], "Hybrid");
        assert_eq!(json["bodyType"], "SUV");
    }
}
