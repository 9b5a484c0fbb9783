//! Base-cost calculation.
//!
//! Pure functions over typed values, no database access. Missing inputs
//! degrade to a zero contribution so the computation is total: a booking
//! can always be priced, even against an incomplete configuration.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::catalog::Program;
use crate::ledger::models::Selection;
use crate::pricing::models::PricingConfiguration;

/// Ticket percentage applied when a person type has no configured entry.
pub const DEFAULT_TICKET_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;

/// Separator used to build a price-table key from the selection's hotel
/// names, in city order.
pub const HOTEL_COMBINATION_SEPARATOR: &str = "_";

/// Round to the nearest whole currency unit, half away from zero.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute the cost basis of a booking.
///
/// `non_hotel = ticket * percentage + visa + guide + transport`, where the
/// percentage comes from the configuration's person-type table. The hotel
/// cost sums per-city `nightly * nights / guests` over the selection's
/// parallel (city, hotel, room type) triples, matched against the chosen
/// package's price structure for the exact hotel combination.
///
/// Returns 0 when no pricing configuration exists for the program.
pub fn compute_base_cost(
    program: &Program,
    pricing: Option<&PricingConfiguration>,
    package_name: Option<&str>,
    selection: &Selection,
    person_type: &str,
) -> Decimal {
    let Some(pricing) = pricing else {
        return Decimal::ZERO;
    };

    let ticket_percentage = pricing.ticket_percentage_for(person_type) / Decimal::ONE_HUNDRED;
    let non_hotel = pricing.ticket_airline_price * ticket_percentage
        + pricing.visa_fee
        + pricing.guide_fee
        + pricing.transport_fee;

    let hotel = hotel_cost(program, pricing, package_name, selection);

    round_amount(non_hotel + hotel)
}

fn hotel_cost(
    program: &Program,
    pricing: &PricingConfiguration,
    package_name: Option<&str>,
    selection: &Selection,
) -> Decimal {
    let Some(package) = package_name.and_then(|name| program.package(name)) else {
        return Decimal::ZERO;
    };
    if !selection.hotel_names.iter().any(|h| !h.is_empty()) {
        return Decimal::ZERO;
    }

    let combination = selection.hotel_names.join(HOTEL_COMBINATION_SEPARATOR);
    let Some(structure) = package
        .price_structures
        .iter()
        .find(|s| s.hotel_combination == combination)
    else {
        return Decimal::ZERO;
    };

    selection
        .cities
        .iter()
        .enumerate()
        .map(|(index, city)| {
            let hotel = selection.hotel_names.get(index);
            let room_type = selection.room_types.get(index);
            let (Some(hotel), Some(room_type)) = (hotel, room_type) else {
                return Decimal::ZERO;
            };

            let nightly = pricing.nightly_price(hotel, city, room_type);
            let nights = program.nights_in(city);
            let guests = structure
                .room_types
                .iter()
                .find(|r| r.room_type == *room_type)
                .map(|r| r.guests);

            match (nightly, nights, guests) {
                (Some(nightly), Some(nights), Some(guests)) if guests > 0 => {
                    nightly * Decimal::from(nights) / Decimal::from(guests)
                }
                _ => Decimal::ZERO,
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{City, Package, PriceStructure, RoomOccupancy};
    use crate::pricing::models::{HotelRate, PersonTypeRate};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn program() -> Program {
        Program {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            name: "Umrah Spring".to_string(),
            cities: vec![City {
                name: "Mecca".to_string(),
                nights: 3,
            }],
            packages: vec![Package {
                name: "Standard".to_string(),
                hotels_by_city: HashMap::from([(
                    "Mecca".to_string(),
                    vec!["Hilton".to_string()],
                )]),
                price_structures: vec![PriceStructure {
                    hotel_combination: "Hilton".to_string(),
                    room_types: vec![RoomOccupancy {
                        room_type: "double".to_string(),
                        guests: 2,
                    }],
                }],
            }],
            total_bookings: 0,
        }
    }

    fn pricing(program: &Program) -> PricingConfiguration {
        PricingConfiguration {
            id: Uuid::new_v4(),
            account_id: program.account_id,
            program_id: program.id,
            ticket_airline_price: dec!(1000),
            visa_fee: dec!(200),
            guide_fee: dec!(50),
            transport_fee: dec!(100),
            hotel_rates: vec![HotelRate {
                hotel_name: "Hilton".to_string(),
                city: "Mecca".to_string(),
                nightly_by_room_type: HashMap::from([("double".to_string(), dec!(300))]),
            }],
            person_types: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn selection() -> Selection {
        Selection {
            cities: vec!["Mecca".to_string()],
            hotel_names: vec!["Hilton".to_string()],
            room_types: vec!["double".to_string()],
        }
    }

    #[test]
    fn worked_example() {
        // non_hotel = 1000 + 200 + 50 + 100 = 1350
        // hotel = 300 * 3 / 2 = 450
        let program = program();
        let pricing = pricing(&program);
        let base = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection(),
            "adult",
        );
        assert_eq!(base, dec!(1800));
    }

    #[test]
    fn missing_pricing_configuration_is_zero() {
        let base = compute_base_cost(&program(), None, Some("Standard"), &selection(), "adult");
        assert_eq!(base, dec!(0));
    }

    #[test]
    fn person_type_percentage_scales_ticket_only() {
        let program = program();
        let mut pricing = pricing(&program);
        pricing.person_types.push(PersonTypeRate {
            person_type: "child".to_string(),
            ticket_percentage: dec!(50),
        });

        // ticket 500 + fees 350 + hotel 450
        let base = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection(),
            "child",
        );
        assert_eq!(base, dec!(1300));

        // Unconfigured person type falls back to 100%.
        let base = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection(),
            "senior",
        );
        assert_eq!(base, dec!(1800));
    }

    #[test]
    fn empty_selection_has_no_hotel_cost() {
        let program = program();
        let pricing = pricing(&program);
        let empty = Selection {
            cities: vec![],
            hotel_names: vec![],
            room_types: vec![],
        };
        let base = compute_base_cost(&program, Some(&pricing), Some("Standard"), &empty, "adult");
        assert_eq!(base, dec!(1350));
    }

    #[test]
    fn blank_hotel_names_have_no_hotel_cost() {
        let program = program();
        let pricing = pricing(&program);
        let blank = Selection {
            cities: vec!["Mecca".to_string()],
            hotel_names: vec![String::new()],
            room_types: vec!["double".to_string()],
        };
        let base = compute_base_cost(&program, Some(&pricing), Some("Standard"), &blank, "adult");
        assert_eq!(base, dec!(1350));
    }

    #[test]
    fn unknown_hotel_combination_is_zero_contribution() {
        let program = program();
        let pricing = pricing(&program);
        let other = Selection {
            cities: vec!["Mecca".to_string()],
            hotel_names: vec!["Sheraton".to_string()],
            room_types: vec!["double".to_string()],
        };
        let base = compute_base_cost(&program, Some(&pricing), Some("Standard"), &other, "adult");
        assert_eq!(base, dec!(1350));
    }

    #[test]
    fn missing_nightly_rate_degrades_to_zero() {
        let program = program();
        let mut pricing = pricing(&program);
        pricing.hotel_rates.clear();
        let base = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection(),
            "adult",
        );
        assert_eq!(base, dec!(1350));
    }

    #[test]
    fn zero_guests_degrades_to_zero() {
        let mut program = program();
        program.packages[0].price_structures[0].room_types[0].guests = 0;
        let pricing = pricing(&program);
        let base = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection(),
            "adult",
        );
        assert_eq!(base, dec!(1350));
    }

    #[test]
    fn no_package_selected_means_fees_only() {
        let program = program();
        let pricing = pricing(&program);
        let base = compute_base_cost(&program, Some(&pricing), None, &selection(), "adult");
        assert_eq!(base, dec!(1350));
    }

    #[test]
    fn result_rounds_half_up() {
        let mut program = program();
        // 1 night, 2 guests, nightly 301 -> hotel 150.5
        program.cities[0].nights = 1;
        let mut pricing = pricing(&program);
        pricing
            .hotel_rates[0]
            .nightly_by_room_type
            .insert("double".to_string(), dec!(301));

        let base = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection(),
            "adult",
        );
        // 1350 + 150.5 = 1500.5 rounds up, not to even
        assert_eq!(base, dec!(1501));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let program = program();
        let pricing = pricing(&program);
        let first = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection(),
            "adult",
        );
        let second = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection(),
            "adult",
        );
        assert_eq!(first, second);
    }

    #[test]
    fn multi_city_selection_sums_contributions() {
        let mut program = program();
        program.cities.push(City {
            name: "Medina".to_string(),
            nights: 2,
        });
        program.packages[0].price_structures = vec![PriceStructure {
            hotel_combination: "Hilton_Oberoi".to_string(),
            room_types: vec![
                RoomOccupancy {
                    room_type: "double".to_string(),
                    guests: 2,
                },
                RoomOccupancy {
                    room_type: "triple".to_string(),
                    guests: 3,
                },
            ],
        }];

        let mut pricing = pricing(&program);
        pricing.hotel_rates.push(HotelRate {
            hotel_name: "Oberoi".to_string(),
            city: "Medina".to_string(),
            nightly_by_room_type: HashMap::from([("triple".to_string(), dec!(150))]),
        });

        let selection = Selection {
            cities: vec!["Mecca".to_string(), "Medina".to_string()],
            hotel_names: vec!["Hilton".to_string(), "Oberoi".to_string()],
            room_types: vec!["double".to_string(), "triple".to_string()],
        };

        // Mecca: 300*3/2 = 450, Medina: 150*2/3 = 100
        let base = compute_base_cost(
            &program,
            Some(&pricing),
            Some("Standard"),
            &selection,
            "adult",
        );
        assert_eq!(base, dec!(1900));
    }
}
