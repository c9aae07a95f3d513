// hospital-core/src/specialty.rs
// ============================================================================
// Module: Disease/Specialty Glossary
// Description: The authoritative disease-to-specialty mapping consulted by
// the appointment coordinator's specialty-match invariant.
// Purpose: Give every caller one source of truth for the mapping table.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A patient's `disease` maps to exactly one `Specialty` via a static table.
//! A doctor whose specialty is [`Specialty::GeneralMedicine`] may treat any
//! disease, matching the "or doctor is GENERAL_MEDICINE" clause in the
//! appointment invariant.

use serde::{Deserialize, Serialize};

/// A medical specialty, as carried on a doctor's profile snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialty {
    /// Catch-all specialty that may treat any disease.
    GeneralMedicine,
    Endocrinology,
    Cardiology,
    Pulmonology,
    Orthopedics,
    Oncology,
    Nephrology,
    Gastroenterology,
    Psychiatry,
    Dermatology,
    Ophthalmology,
    Ent,
    Neurology,
}

/// A diagnosed disease, as carried on a patient's profile snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Disease {
    Diabetes,
    Hypertension,
    Asthma,
    HeartDisease,
    Arthritis,
    Cancer,
    Tuberculosis,
    Covid19,
    Pneumonia,
    Malaria,
    Dengue,
    Typhoid,
    KidneyDisease,
    LiverDisease,
    ThyroidDisorder,
    MentalHealthDisorder,
    SkinDisease,
    EyeDisease,
    EntDisorder,
    NeurologicalDisorder,
    GastrointestinalDisorder,
    RespiratoryDisorder,
    BoneFracture,
    Other,
}

/// Returns the authoritative specialty for a given disease.
#[must_use]
pub const fn specialty_for_disease(disease: Disease) -> Specialty {
    match disease {
        Disease::Diabetes | Disease::ThyroidDisorder => Specialty::Endocrinology,
        Disease::Hypertension | Disease::HeartDisease => Specialty::Cardiology,
        Disease::Asthma
        | Disease::Tuberculosis
        | Disease::Covid19
        | Disease::Pneumonia
        | Disease::RespiratoryDisorder => Specialty::Pulmonology,
        Disease::Arthritis | Disease::BoneFracture => Specialty::Orthopedics,
        Disease::Cancer => Specialty::Oncology,
        Disease::Malaria | Disease::Dengue | Disease::Typhoid | Disease::Other => {
            Specialty::GeneralMedicine
        }
        Disease::KidneyDisease => Specialty::Nephrology,
        Disease::LiverDisease | Disease::GastrointestinalDisorder => Specialty::Gastroenterology,
        Disease::MentalHealthDisorder => Specialty::Psychiatry,
        Disease::SkinDisease => Specialty::Dermatology,
        Disease::EyeDisease => Specialty::Ophthalmology,
        Disease::EntDisorder => Specialty::Ent,
        Disease::NeurologicalDisorder => Specialty::Neurology,
    }
}

/// Returns true when a doctor of the given specialty may treat the disease.
#[must_use]
pub fn specialty_matches(disease: Disease, specialty: Specialty) -> bool {
    specialty == Specialty::GeneralMedicine || specialty_for_disease(disease) == specialty
}
