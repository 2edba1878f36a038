//! English and Spanish rendering of check values, explanations and summaries.

use super::assessment::AssessmentCategory;
use super::monetary::format::{count, currency, number};
use super::monetary::{CheckDetail, CountUnit, InputField, ThresholdDerivation};
use super::rules::WageAggregate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    /// Accepts `en`/`es` tags, including regional variants like `es-MX`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Language::English),
            "es" => Some(Language::Spanish),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
        }
    }
}

pub fn basis_label(basis: WageAggregate, language: Language) -> &'static str {
    match (language, basis) {
        (Language::English, WageAggregate::BasePeriod) => "Base period wages",
        (Language::English, WageAggregate::HighestQuarter) => "Highest quarter wages",
        (Language::English, WageAggregate::TwoHighestQuarters) => "Two highest quarters",
        (Language::English, WageAggregate::LastTwoQuarters) => "Last two quarters",
        (Language::English, WageAggregate::AverageTwoHighestQuarters) => {
            "Average of two highest quarters"
        }
        (Language::English, WageAggregate::OutsideHighQuarter) => {
            "Wages outside your highest quarter"
        }
        (Language::English, WageAggregate::AverageWeekly) => "Average weekly wages",
        (Language::Spanish, WageAggregate::BasePeriod) => "Salarios del período base",
        (Language::Spanish, WageAggregate::HighestQuarter) => "Salarios del trimestre más alto",
        (Language::Spanish, WageAggregate::TwoHighestQuarters) => "Dos trimestres más altos",
        (Language::Spanish, WageAggregate::LastTwoQuarters) => "Últimos dos trimestres",
        (Language::Spanish, WageAggregate::AverageTwoHighestQuarters) => {
            "Promedio de los dos trimestres más altos"
        }
        (Language::Spanish, WageAggregate::OutsideHighQuarter) => {
            "Salarios fuera del trimestre más alto"
        }
        (Language::Spanish, WageAggregate::AverageWeekly) => "Salarios semanales promedio",
    }
}

fn unit_words(unit: CountUnit, language: Language) -> (&'static str, &'static str) {
    match (language, unit) {
        (Language::English, CountUnit::Quarters) => ("quarter", "quarters"),
        (Language::English, CountUnit::Hours) => ("hour", "hours"),
        (Language::English, CountUnit::Weeks) => ("week", "weeks"),
        (Language::Spanish, CountUnit::Quarters) => ("trimestre", "trimestres"),
        (Language::Spanish, CountUnit::Hours) => ("hora", "horas"),
        (Language::Spanish, CountUnit::Weeks) => ("semana", "semanas"),
    }
}

fn counted(value: u32, unit: CountUnit, language: Language) -> String {
    let (singular, plural) = unit_words(unit, language);
    count(value, singular, plural)
}

pub fn actual_value(detail: &CheckDetail, language: Language) -> String {
    match detail {
        CheckDetail::Wages { actual, .. } => currency(*actual),
        CheckDetail::QualifyingQuarters {
            floor, qualifying, ..
        } => match language {
            Language::English => format!(
                "{} with {}+",
                counted(*qualifying, CountUnit::Quarters, language),
                currency(*floor)
            ),
            Language::Spanish => format!(
                "{} con {}+",
                counted(*qualifying, CountUnit::Quarters, language),
                currency(*floor)
            ),
        },
        CheckDetail::Count { unit, actual, .. } => counted(*actual, *unit, language),
    }
}

pub fn required_value(detail: &CheckDetail, language: Language) -> String {
    match detail {
        CheckDetail::Wages {
            threshold,
            derivation,
            ..
        } => match derivation {
            ThresholdDerivation::HighQuarterMultiple { multiplier, .. } => {
                let label = match language {
                    Language::English => "HQW",
                    Language::Spanish => "salario del trimestre más alto",
                };
                format!("{} ({}x {label})", currency(*threshold), number(*multiplier))
            }
            ThresholdDerivation::WbaMultiple { multiplier, .. } => {
                let label = match language {
                    Language::English => "WBA",
                    Language::Spanish => "beneficio semanal",
                };
                format!("{} ({}x {label})", currency(*threshold), number(*multiplier))
            }
            _ => currency(*threshold),
        },
        CheckDetail::QualifyingQuarters {
            floor, required, ..
        } => {
            let connector = match language {
                Language::English => "in",
                Language::Spanish => "en",
            };
            format!(
                "{} {connector} {}",
                currency(*floor),
                counted(*required, CountUnit::Quarters, language)
            )
        }
        CheckDetail::Count { unit, required, .. } => counted(*required, *unit, language),
    }
}

/// One-sentence explanation of why a check passed or failed.
pub fn explain(detail: &CheckDetail, passed: bool, language: Language) -> String {
    match detail {
        CheckDetail::Wages {
            basis,
            actual,
            threshold,
            derivation,
        } => explain_wages(
            *basis,
            *actual,
            *threshold,
            derivation,
            passed,
            language,
        ),
        CheckDetail::QualifyingQuarters {
            floor,
            qualifying,
            required,
        } => {
            let floor = currency(*floor);
            match (language, passed) {
                (Language::English, true) => {
                    format!("You have {qualifying} quarters with at least {floor}")
                }
                (Language::English, false) => format!(
                    "Need at least {floor} in {required} quarters, but only {qualifying} qualify"
                ),
                (Language::Spanish, true) => {
                    format!("Tienes {qualifying} trimestres con al menos {floor}")
                }
                (Language::Spanish, false) => format!(
                    "Necesitas al menos {floor} en {required} trimestres, pero solo {qualifying} califican"
                ),
            }
        }
        CheckDetail::Count {
            unit,
            actual,
            required,
        } => explain_count(*unit, *actual, *required, passed, language),
    }
}

fn explain_count(
    unit: CountUnit,
    actual: u32,
    required: u32,
    passed: bool,
    language: Language,
) -> String {
    match (language, unit, passed) {
        (Language::English, CountUnit::Quarters, true) => format!(
            "You have wages in {actual} quarters, meeting the {required}-quarter requirement"
        ),
        (Language::English, CountUnit::Quarters, false) => format!(
            "You need wages in at least {required} quarters, but only have {actual}"
        ),
        (Language::English, CountUnit::Hours, true) => {
            format!("You worked {actual} hours, meeting the {required}-hour requirement")
        }
        (Language::English, CountUnit::Hours, false) => {
            format!("You need at least {required} hours worked, but only have {actual}")
        }
        (Language::English, CountUnit::Weeks, true) => {
            format!("You worked {actual} weeks, meeting the {required}-week requirement")
        }
        (Language::English, CountUnit::Weeks, false) => {
            format!("You need at least {required} weeks worked, but only have {actual}")
        }
        (Language::Spanish, CountUnit::Quarters, true) => format!(
            "Tienes salarios en {actual} trimestres, cumpliendo el requisito de {required} trimestres"
        ),
        (Language::Spanish, CountUnit::Quarters, false) => format!(
            "Necesitas salarios en al menos {required} trimestres, pero solo tienes {actual}"
        ),
        (Language::Spanish, CountUnit::Hours, true) => format!(
            "Trabajaste {actual} horas, cumpliendo el requisito de {required} horas"
        ),
        (Language::Spanish, CountUnit::Hours, false) => format!(
            "Necesitas al menos {required} horas trabajadas, pero solo tienes {actual}"
        ),
        (Language::Spanish, CountUnit::Weeks, true) => format!(
            "Trabajaste {actual} semanas, cumpliendo el requisito de {required} semanas"
        ),
        (Language::Spanish, CountUnit::Weeks, false) => format!(
            "Necesitas al menos {required} semanas trabajadas, pero solo tienes {actual}"
        ),
    }
}

fn explain_wages(
    basis: WageAggregate,
    actual: f64,
    threshold: f64,
    derivation: &ThresholdDerivation,
    passed: bool,
    language: Language,
) -> String {
    let label = basis_label(basis, language);
    let amount = currency(actual);
    let required = currency(threshold);

    match (language, passed) {
        (Language::English, true) => match derivation {
            ThresholdDerivation::HighQuarterMultiple { multiplier, .. } => format!(
                "{label} ({amount}) meet the {}x high quarter requirement",
                number(*multiplier)
            ),
            ThresholdDerivation::WbaMultiple { multiplier, .. } => format!(
                "{label} ({amount}) meet the {}x weekly benefit amount requirement",
                number(*multiplier)
            ),
            ThresholdDerivation::MinimumWageMultiple { .. } => {
                format!("{label} ({amount}) meet the minimum wage requirement")
            }
            ThresholdDerivation::StateAverageWage { .. } => {
                format!("{label} ({amount}) meet the state average wage requirement")
            }
            ThresholdDerivation::Fixed | ThresholdDerivation::PercentOf { .. } => {
                format!("{label} ({amount}) meet the minimum {required} requirement")
            }
        },
        (Language::English, false) => match derivation {
            ThresholdDerivation::HighQuarterMultiple {
                multiplier,
                high_quarter,
                ..
            } => format!(
                "{label} ({amount}) must be at least {}x your highest quarter ({}) = {required}",
                number(*multiplier),
                currency(*high_quarter)
            ),
            ThresholdDerivation::WbaMultiple {
                multiplier,
                estimated_wba,
            } => format!(
                "{label} ({amount}) must be at least {}x the weekly benefit amount ({}) = {required}",
                number(*multiplier),
                currency(*estimated_wba)
            ),
            ThresholdDerivation::MinimumWageMultiple {
                multiplier,
                hourly_wage,
            } => format!(
                "{label} ({amount}) must be at least {} hours at {}/hour = {required}",
                number(*multiplier),
                currency(*hourly_wage)
            ),
            ThresholdDerivation::StateAverageWage { .. } => format!(
                "{label} ({amount}) must be at least {required} based on state average wages"
            ),
            ThresholdDerivation::PercentOf {
                percentage, of, ..
            } => format!(
                "{label} ({amount}) must be at least {}% of {} = {required}",
                number(*percentage),
                basis_label(*of, language).to_lowercase()
            ),
            ThresholdDerivation::Fixed => {
                format!("{label} ({amount}) must be at least {required}")
            }
        },
        (Language::Spanish, true) => match derivation {
            ThresholdDerivation::HighQuarterMultiple { multiplier, .. } => format!(
                "{label} ({amount}) cumplen el requisito de {}x el trimestre más alto",
                number(*multiplier)
            ),
            ThresholdDerivation::WbaMultiple { multiplier, .. } => format!(
                "{label} ({amount}) cumplen el requisito de {}x el beneficio semanal",
                number(*multiplier)
            ),
            ThresholdDerivation::MinimumWageMultiple { .. } => {
                format!("{label} ({amount}) cumplen el requisito de salario mínimo")
            }
            ThresholdDerivation::StateAverageWage { .. } => {
                format!("{label} ({amount}) cumplen el requisito de salario promedio estatal")
            }
            ThresholdDerivation::Fixed | ThresholdDerivation::PercentOf { .. } => {
                format!("{label} ({amount}) cumplen el requisito mínimo de {required}")
            }
        },
        (Language::Spanish, false) => match derivation {
            ThresholdDerivation::HighQuarterMultiple {
                multiplier,
                high_quarter,
                ..
            } => format!(
                "{label} ({amount}) deben ser al menos {}x tu trimestre más alto ({}) = {required}",
                number(*multiplier),
                currency(*high_quarter)
            ),
            ThresholdDerivation::WbaMultiple {
                multiplier,
                estimated_wba,
            } => format!(
                "{label} ({amount}) deben ser al menos {}x el beneficio semanal ({}) = {required}",
                number(*multiplier),
                currency(*estimated_wba)
            ),
            ThresholdDerivation::MinimumWageMultiple {
                multiplier,
                hourly_wage,
            } => format!(
                "{label} ({amount}) deben ser al menos {} horas a {}/hora = {required}",
                number(*multiplier),
                currency(*hourly_wage)
            ),
            ThresholdDerivation::StateAverageWage { .. } => format!(
                "{label} ({amount}) deben ser al menos {required} según los salarios promedio del estado"
            ),
            ThresholdDerivation::PercentOf {
                percentage, of, ..
            } => format!(
                "{label} ({amount}) deben ser al menos {}% de {} = {required}",
                number(*percentage),
                basis_label(*of, language).to_lowercase()
            ),
            ThresholdDerivation::Fixed => {
                format!("{label} ({amount}) deben ser al menos {required}")
            }
        },
    }
}

/// Verdict sentence once every required input was present.
pub fn summary(language: Language, state_name: &str, failed: usize) -> String {
    match (language, failed) {
        (Language::English, 0) => {
            format!("You appear to meet {state_name}'s monetary eligibility requirements.")
        }
        (Language::English, n) => format!(
            "You may not meet {state_name}'s monetary eligibility requirements ({n} requirement(s) not met)."
        ),
        (Language::Spanish, 0) => format!(
            "Parece que cumples con los requisitos monetarios de elegibilidad de {state_name}."
        ),
        (Language::Spanish, n) => format!(
            "Es posible que no cumplas con los requisitos monetarios de {state_name} ({n} requisito(s) no cumplido(s))."
        ),
    }
}

pub fn missing_summary(
    language: Language,
    missing: &[InputField],
    min_hours: Option<u32>,
    min_weeks: Option<u32>,
) -> String {
    let fields = missing
        .iter()
        .map(|field| {
            let threshold = match field {
                InputField::HoursWorked => min_hours,
                InputField::WeeksWorked => min_weeks,
                _ => None,
            };
            match (threshold, language) {
                (Some(minimum), Language::English) => {
                    format!("{} ({minimum} required)", field.as_str())
                }
                (Some(minimum), Language::Spanish) => {
                    format!("{} (se requieren {minimum})", field.as_str())
                }
                (None, _) => field.as_str().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    match language {
        Language::English => format!("Missing required information: {fields}"),
        Language::Spanish => format!("Falta información requerida: {fields}"),
    }
}

/// Title and one-line description for a qualitative assessment category.
pub fn assessment_label(
    category: AssessmentCategory,
    language: Language,
) -> (&'static str, &'static str) {
    match (language, category) {
        (Language::English, AssessmentCategory::MostLikely) => (
            "Most likely eligible",
            "Your situation closely matches the handbook's eligibility criteria.",
        ),
        (Language::English, AssessmentCategory::Likely) => (
            "Likely eligible",
            "Your situation generally fits the eligibility criteria, with some open questions.",
        ),
        (Language::English, AssessmentCategory::Unlikely) => (
            "Unlikely to be eligible",
            "Your separation circumstances commonly lead to disqualification.",
        ),
        (Language::English, AssessmentCategory::Uncertain) => (
            "Eligibility uncertain",
            "The outcome depends on details the state will need to review.",
        ),
        (Language::Spanish, AssessmentCategory::MostLikely) => (
            "Muy probablemente elegible",
            "Tu situación coincide estrechamente con los criterios de elegibilidad del manual.",
        ),
        (Language::Spanish, AssessmentCategory::Likely) => (
            "Probablemente elegible",
            "Tu situación se ajusta en general a los criterios, con algunas preguntas pendientes.",
        ),
        (Language::Spanish, AssessmentCategory::Unlikely) => (
            "Probablemente no elegible",
            "Las circunstancias de tu separación suelen llevar a una descalificación.",
        ),
        (Language::Spanish, AssessmentCategory::Uncertain) => (
            "Elegibilidad incierta",
            "El resultado depende de detalles que el estado deberá revisar.",
        ),
    }
}
