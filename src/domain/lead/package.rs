//! Website packages and their pricing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Fixed deposit for every package, in cents.
pub const DEPOSIT_CENTS: i64 = 200_00;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Package {
    Starter,
    Growth,
    Premium,
    Custom,
}

impl Package {
    pub fn as_str(&self) -> &'static str {
        match self {
            Package::Starter => "starter",
            Package::Growth => "growth",
            Package::Premium => "premium",
            Package::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Package::Starter => "Starter",
            Package::Growth => "Growth",
            Package::Premium => "Premium",
            Package::Custom => "Custom",
        }
    }

    /// Package price in cents; custom work is quoted individually.
    pub fn total_cents(&self) -> Option<i64> {
        match self {
            Package::Starter => Some(900_00),
            Package::Growth => Some(1_200_00),
            Package::Premium => Some(2_000_00),
            Package::Custom => None,
        }
    }

    /// Whether a customer may pick this package on the dashboard.
    /// Custom work is only set up by the studio.
    pub fn is_self_selectable(&self) -> bool {
        !matches!(self, Package::Custom)
    }

    pub fn total_display(&self) -> String {
        self.total_cents()
            .map(format_eur)
            .unwrap_or_else(|| "Quote on request".to_string())
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Package {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Package::Starter),
            "growth" => Ok(Package::Growth),
            "premium" => Ok(Package::Premium),
            "custom" => Ok(Package::Custom),
            other => Err(ValidationError::invalid_format(
                "package",
                format!("unknown package '{other}'"),
            )),
        }
    }
}

/// Euro amount for display: `€1,200` or `€1,200.50`.
pub fn format_eur(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let euros = cents / 100;
    let rest = cents % 100;

    let digits = euros.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rest == 0 {
        format!("{sign}€{grouped}")
    } else {
        format!("{sign}€{grouped}.{rest:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_prices() {
        assert_eq!(Package::Starter.total_cents(), Some(90_000));
        assert_eq!(Package::Growth.total_cents(), Some(120_000));
        assert_eq!(Package::Premium.total_cents(), Some(200_000));
        assert_eq!(Package::Custom.total_cents(), None);
        assert_eq!(DEPOSIT_CENTS, 20_000);
    }

    #[test]
    fn package_parsing() {
        assert_eq!("growth".parse::<Package>().unwrap(), Package::Growth);
        assert!("enterprise".parse::<Package>().is_err());
    }

    #[test]
    fn custom_is_not_self_selectable() {
        assert!(Package::Starter.is_self_selectable());
        assert!(Package::Premium.is_self_selectable());
        assert!(!Package::Custom.is_self_selectable());
    }

    #[test]
    fn total_display() {
        assert_eq!(Package::Growth.total_display(), "€1,200");
        assert_eq!(Package::Custom.total_display(), "Quote on request");
    }

    #[test]
    fn format_eur_groups_thousands() {
        assert_eq!(format_eur(0), "€0");
        assert_eq!(format_eur(20_000), "€200");
        assert_eq!(format_eur(100_000), "€1,000");
        assert_eq!(format_eur(123_456_789), "€1,234,567.89");
        assert_eq!(format_eur(1_050), "€10.50");
        assert_eq!(format_eur(-500), "-€5");
    }
}
