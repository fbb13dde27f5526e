//! vCard 4.0 export of a decoded personal-details record.

use chrono::Utc;

use crate::decode::auth::Credentials;
use crate::decode::details::PersonalDetails;
use crate::session::Session;

/// Build the contact card as a newline-joined text block.
///
/// The line order is fixed; `BDAY` and `NOTE` are emitted only when they have
/// content, so the block runs 14 to 16 lines. Embedded line breaks in the
/// address become the literal two-character sequence `\n`.
pub fn export_vcard(
    details: &PersonalDetails,
    session: &Session,
    credentials: &Credentials,
    student_id: &str,
) -> String {
    let [first, forenames, last] = &details.names;

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:4.0".to_string(),
        format!("N:{last};{first};{forenames};;"),
        format!("NICKNAME:{first}"),
        format!("FN:{first} {last}"),
        format!("ORG:{}", session.portal),
        format!("GENDER:{}", details.gender[0]),
        format!("TITLE:Year {} student", details.year_level),
        format!(
            "PHOTO:{}",
            session.photo_url(&credentials.key, student_id)
        ),
        format!("TEL;TYPE=cell:{}", details.mobile),
        format!("ADR;TYPE=home:;;{};;;;", escape_breaks(&details.address)),
        format!("EMAIL:{}", details.email),
        format!("REV:{}", Utc::now().format("%Y%m%dT%H%M%SZ")),
    ];

    if !details.birthdate.is_empty() {
        lines.push(format!("BDAY:{}", details.birthdate));
    }
    if !details.medical_notes.is_empty() {
        lines.push(format!("NOTE:{}", escape_breaks(&details.medical_notes)));
    }
    lines.push("END:VCARD".to_string());

    lines.join("\n")
}

fn escape_breaks(s: &str) -> String {
    s.replace("\r\n", "\\n").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::details::decode_personal_details;
    use crate::xml::Node;

    fn fixture() -> (PersonalDetails, Session, Credentials) {
        let root = Node::parse(
            r#"<GetStudentDetailsResults>
                <FirstName>Jane</FirstName>
                <ForeNames>Jane Ngaio</ForeNames>
                <LastName>Bloggs</LastName>
                <Gender>Female</Gender>
                <DateBirth>2008-05-14</DateBirth>
                <SchoolYear>12</SchoolYear>
                <MobilePhone>021 555 0199</MobilePhone>
                <Email>jane.bloggs@school.nz</Email>
                <HomeAddress>12 Example St
Auckland</HomeAddress>
                <MedicalNotes>Asthma</MedicalNotes>
            </GetStudentDetailsResults>"#,
        )
        .unwrap();
        let details =
            decode_personal_details(root.first("GetStudentDetailsResults").unwrap()).unwrap();
        let session = Session::new("demo.school.nz", 2024, "2024TT");
        let credentials = Credentials {
            username: "12345".to_string(),
            key: "abc123".to_string(),
            auth_level: 0,
        };
        (details, session, credentials)
    }

    #[test]
    fn test_line_order_and_count() {
        let (details, session, creds) = fixture();
        let card = export_vcard(&details, &session, &creds, "12345");
        let lines: Vec<&str> = card.lines().collect();

        assert_eq!(lines.first(), Some(&"BEGIN:VCARD"));
        assert_eq!(lines.get(1), Some(&"VERSION:4.0"));
        assert_eq!(lines.get(2), Some(&"N:Bloggs;Jane;Jane Ngaio;;"));
        assert_eq!(lines.last(), Some(&"END:VCARD"));
        assert_eq!(lines.len(), 16);
    }

    #[test]
    fn test_address_breaks_become_literal_backslash_n() {
        let (details, session, creds) = fixture();
        let card = export_vcard(&details, &session, &creds, "12345");
        assert!(card.contains("ADR;TYPE=home:;;12 Example St\\nAuckland;;;;"));
    }

    #[test]
    fn test_photo_url_uses_portal_and_key() {
        let (details, session, creds) = fixture();
        let card = export_vcard(&details, &session, &creds, "12345");
        assert!(card
            .contains("PHOTO:https://demo.school.nz/api/img.php?Key=abc123&StudentID=12345"));
    }

    #[test]
    fn test_optional_lines_dropped_when_empty() {
        let (mut details, session, creds) = fixture();
        details.birthdate.clear();
        details.medical_notes.clear();
        let card = export_vcard(&details, &session, &creds, "12345");
        assert!(!card.contains("BDAY:"));
        assert!(!card.contains("NOTE:"));
        assert_eq!(card.lines().count(), 14);
    }
}
