//! Personal details decoding.
//!
//! The service ships these as a flat list of fields on the result element;
//! the decoder regroups them: identity, own contact details, the two
//! custodial ("life") households, mother/father, the emergency contact, and
//! the medical flags.

use serde::{Deserialize, Serialize};

use crate::error::KamarError;
use crate::xml::Node;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactGroup {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentRecord {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub occupation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalDetails {
    /// First name, forenames, last name.
    pub names: [String; 3],
    /// Glyph plus the source text. The glyph is chosen by exact equality
    /// with `"Male"`.
    pub gender: [String; 2],
    pub birthdate: String,
    pub year_level: String,
    pub tutor_group: String,
    pub mobile: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// Custodial households A and B.
    pub life_a: ContactGroup,
    pub life_b: ContactGroup,
    pub mother: ParentRecord,
    pub father: ParentRecord,
    pub emergency: EmergencyContact,
    pub allowed_panadol: bool,
    pub allowed_ibuprofen: bool,
    pub health_flag: bool,
    pub medical_notes: String,
}

const MALE_GLYPH: &str = "\u{2642}\u{fe0f}";
const FEMALE_GLYPH: &str = "\u{2640}\u{fe0f}";

/// Decode `GetStudentDetailsResults`.
pub fn decode_personal_details(body: &Node) -> Result<PersonalDetails, KamarError> {
    let leaf = |tag: &str| body.leaf(tag).unwrap_or("").to_string();
    let flag = |tag: &str| body.leaf(tag) == Some("Y");

    let gender_text = leaf("Gender");
    let glyph = if gender_text == "Male" {
        MALE_GLYPH
    } else {
        FEMALE_GLYPH
    };

    Ok(PersonalDetails {
        names: [leaf("FirstName"), leaf("ForeNames"), leaf("LastName")],
        gender: [glyph.to_string(), gender_text],
        birthdate: leaf("DateBirth"),
        year_level: leaf("SchoolYear"),
        tutor_group: leaf("TutorGroup"),
        mobile: leaf("MobilePhone"),
        phone: leaf("HomePhone"),
        email: leaf("Email"),
        address: leaf("HomeAddress"),
        life_a: ContactGroup {
            name: leaf("LifeAName"),
            address: leaf("LifeAAddress"),
            phone: leaf("LifeAPhone"),
            email: leaf("LifeAEmail"),
        },
        life_b: ContactGroup {
            name: leaf("LifeBName"),
            address: leaf("LifeBAddress"),
            phone: leaf("LifeBPhone"),
            email: leaf("LifeBEmail"),
        },
        mother: ParentRecord {
            name: leaf("MotherName"),
            phone: leaf("MotherPhone"),
            email: leaf("MotherEmail"),
            occupation: leaf("MotherOccupation"),
        },
        father: ParentRecord {
            name: leaf("FatherName"),
            phone: leaf("FatherPhone"),
            email: leaf("FatherEmail"),
            occupation: leaf("FatherOccupation"),
        },
        emergency: EmergencyContact {
            name: leaf("EmergencyName"),
            phone: leaf("EmergencyPhone"),
            relationship: leaf("EmergencyRelation"),
        },
        allowed_panadol: flag("AllowedPanadol"),
        allowed_ibuprofen: flag("AllowedIbuprofen"),
        health_flag: flag("HealthFlag"),
        medical_notes: leaf("MedicalNotes"),
    })
}
