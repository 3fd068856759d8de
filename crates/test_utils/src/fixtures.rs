//! Pre-built Test Fixtures
//!
//! The reference catalogue as plain values and as a ready-made mock
//! provider. Amounts match the seeded migration and the in-memory catalogue
//! so the same expectations hold against every backend.

use core_kernel::{CurrencyCode, Rate};
use domain_pricing::{MockPricingPort, PricingService, PricingSettings};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for pricing settings
pub struct SettingsFixtures;

impl SettingsFixtures {
    /// 1200 CLP per km, 20% commission, CLP, two decimals
    pub fn reference() -> PricingSettings {
        PricingSettings {
            base_per_km_clp: dec!(1200),
            commission_rate: Rate::new(dec!(0.20)),
            default_currency: CurrencyCode::clp(),
            rounding_decimals: 2,
        }
    }

    /// Reference settings rounded to whole pesos
    pub fn whole_pesos() -> PricingSettings {
        PricingSettings {
            rounding_decimals: 0,
            ..Self::reference()
        }
    }
}

/// Fixture for catalogue services
pub struct ServiceFixtures;

impl ServiceFixtures {
    pub fn urban_transfer() -> PricingService {
        PricingService::transfer("T003", "Traslado Urbano", dec!(12000))
    }

    pub fn airport_transfer() -> PricingService {
        PricingService::transfer("T004", "Traslado Aeropuerto", dec!(42000))
    }

    pub fn integrated_route() -> PricingService {
        PricingService::transfer("T009", "Ruta Integrada", dec!(36000))
    }

    pub fn vina_tour() -> PricingService {
        PricingService::tour("T014", "Tour Viña del Mar", dec!(250000), dec!(350000))
    }

    pub fn maipo_tour() -> PricingService {
        PricingService::tour("T015", "Tour Cajón del Maipo", dec!(250000), dec!(250000))
    }

    pub fn all() -> Vec<PricingService> {
        vec![
            Self::urban_transfer(),
            Self::airport_transfer(),
            Self::integrated_route(),
            Self::vina_tour(),
            Self::maipo_tour(),
        ]
    }
}

/// Factor tables of the reference catalogue
pub struct FactorFixtures;

impl FactorFixtures {
    pub fn vehicles() -> Vec<(&'static str, Decimal)> {
        vec![
            ("van_estandar", dec!(1.0)),
            ("van_premium", dec!(1.4)),
            ("minibus_estandar", dec!(1.4)),
            ("minibus_premium", dec!(2.0)),
            ("bus_estandar", dec!(2.0)),
            ("bus_premium", dec!(2.5)),
            ("sedan_ejecutivo", dec!(1.2)),
            ("suv_premium", dec!(2.0)),
        ]
    }

    pub fn segments() -> Vec<(&'static str, Decimal)> {
        vec![("B2C", dec!(1.0)), ("B2B", dec!(0.9))]
    }

    pub fn zones() -> Vec<(&'static str, Decimal)> {
        vec![
            ("urbana", dec!(1.0)),
            ("mixta", dec!(1.1)),
            ("rural", dec!(1.2)),
            ("interregional", dec!(1.3)),
        ]
    }

    pub fn schedules() -> Vec<(&'static str, Decimal)> {
        vec![("normal", dec!(1.0)), ("punta", dec!(1.3)), ("nocturno", dec!(1.2))]
    }

    /// CLP per one unit of each currency
    pub fn currency_rates() -> Vec<(&'static str, Decimal)> {
        vec![("CLP", dec!(1)), ("PEN", dec!(235)), ("USD", dec!(950))]
    }
}

/// A mock provider loaded with the whole reference catalogue
///
/// Chain `failing` or `delayed` onto the result to inject faults.
pub fn reference_provider() -> MockPricingPort {
    let mut mock = MockPricingPort::new().with_settings(SettingsFixtures::reference());
    for service in ServiceFixtures::all() {
        mock = mock.with_service(service);
    }
    for (id, factor) in FactorFixtures::vehicles() {
        mock = mock.with_vehicle_factor(id, factor);
    }
    for (id, factor) in FactorFixtures::segments() {
        mock = mock.with_segment_factor(id, factor);
    }
    for (id, factor) in FactorFixtures::zones() {
        mock = mock.with_zone_factor(id, factor);
    }
    for (id, factor) in FactorFixtures::schedules() {
        mock = mock.with_schedule_factor(id, factor);
    }
    for (code, rate) in FactorFixtures::currency_rates() {
        mock = mock.with_currency_rate(code, rate);
    }
    mock.with_schedule_override("T015", "punta", dec!(1.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_settings_are_valid() {
        assert!(SettingsFixtures::reference().validate().is_ok());
        assert!(SettingsFixtures::whole_pesos().validate().is_ok());
    }

    #[test]
    fn test_service_codes_unique() {
        let mut codes: Vec<String> = ServiceFixtures::all().into_iter().map(|s| s.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 5);
    }
}
