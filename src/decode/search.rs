//! Student search decoding.

use serde::{Deserialize, Serialize};

use crate::error::KamarError;
use crate::xml::Node;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentMatch {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub year_level: String,
}

/// Decode `SearchStudentsResults`. No matches is an empty list, not an error.
pub fn decode_student_search(body: &Node) -> Result<Vec<StudentMatch>, KamarError> {
    let students = body.first("Students").map(|s| s.all("Student")).unwrap_or(&[]);
    students
        .iter()
        .map(|student| {
            Ok(StudentMatch {
                student_id: student.require_leaf("StudentID")?.to_string(),
                first_name: student.leaf("FirstName").unwrap_or("").to_string(),
                last_name: student.leaf("LastName").unwrap_or("").to_string(),
                year_level: student.leaf("SchoolYear").unwrap_or("").to_string(),
            })
        })
        .collect()
}
