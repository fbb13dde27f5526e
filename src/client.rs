//! High-level client: one method per remote command.
//!
//! `Kamar` owns the session and the logon credentials, wires each dispatch
//! to the matching decoder, and is the sole writer of the session's
//! `week_index`. Attendance must be fetched before the timetable; see
//! [`crate::session::Session`] for the concurrency contract.

use crate::decode::attendance::{decode_absence_stats, decode_attendance, Attendance};
use crate::decode::auth::{decode_logon, Credentials, TEACHER_AUTH_LEVEL};
use crate::decode::details::{decode_personal_details, PersonalDetails};
use crate::decode::ncea::{decode_ncea_summary, NceaSummary};
use crate::decode::results::{decode_results, ResultLevels};
use crate::decode::search::{decode_student_search, StudentMatch};
use crate::decode::timetable::{decode_timetable, Timetable};
use crate::dispatch::{dispatch, Command, BOOTSTRAP_KEY};
use crate::envelope::Envelope;
use crate::error::KamarError;
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use crate::vcard::export_vcard;
use std::collections::BTreeMap;

pub struct Kamar {
    session: Session,
    transport: Box<dyn Transport>,
    credentials: Option<Credentials>,
}

impl Kamar {
    pub fn new(session: Session) -> Self {
        Self::with_transport(session, Box::new(HttpTransport::new()))
    }

    /// Build a client over a caller-supplied transport.
    pub fn with_transport(session: Session, transport: Box<dyn Transport>) -> Self {
        Kamar {
            session,
            transport,
            credentials: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn auth(&self) -> Result<&Credentials, KamarError> {
        self.credentials
            .as_ref()
            .ok_or_else(|| KamarError::state("not logged on"))
    }

    /// Check that the response came back under the decoder's result element.
    fn expect(env: Envelope, expected: &str) -> Result<Envelope, KamarError> {
        if env.result_key != expected {
            return Err(KamarError::decode(
                env.result_key,
                format!("expected {expected}"),
            ));
        }
        Ok(env)
    }

    /// Log on and store the credentials for subsequent commands.
    pub async fn logon(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<&Credentials, KamarError> {
        let cmd = Command::new("Logon")
            .field("Username", username)
            .field("Password", password);
        let env = dispatch(&self.session, &*self.transport, BOOTSTRAP_KEY, &cmd).await?;
        let env = Self::expect(env, "LogonResults")?;

        let credentials = decode_logon(username, &env.body)?;
        log::debug!(
            "logged on as {} (level {})",
            credentials.username,
            credentials.auth_level
        );
        Ok(self.credentials.insert(credentials))
    }

    /// Fetch and decode attendance. Establishes the session's week index;
    /// when the portal has no attendance configured, the week index defaults
    /// to 1 and the recoverable state error is passed through.
    pub async fn attendance(&mut self) -> Result<Attendance, KamarError> {
        let creds = self.auth()?;
        let cmd = Command::new("GetStudentAttendance")
            .field("StudentID", &creds.username)
            .field("Year", self.session.year.to_string());
        let env = dispatch(&self.session, &*self.transport, &creds.key, &cmd).await?;
        let env = Self::expect(env, "StudentAttendanceResults")?;

        match decode_attendance(&env.body) {
            Ok(attendance) => {
                self.session.week_index = Some(attendance.week_index);
                Ok(attendance)
            }
            Err(err) if err.is_recoverable() => {
                self.session.week_index = Some(1);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch the absence statistics record.
    pub async fn absence_stats(&self) -> Result<BTreeMap<String, String>, KamarError> {
        let creds = self.auth()?;
        let cmd = Command::new("GetStudentAbsenceStats")
            .field("StudentID", &creds.username)
            .field("Year", self.session.year.to_string());
        let env = dispatch(&self.session, &*self.transport, &creds.key, &cmd).await?;
        let env = Self::expect(env, "StudentAbsenceStatsResults")?;
        decode_absence_stats(&env.body)
    }

    /// Fetch this week's and next week's timetable.
    ///
    /// Requires the week index established by [`Kamar::attendance`]; teacher
    /// accounts (level 10) are routed to the teacher command variant.
    pub async fn timetable(&self) -> Result<Timetable, KamarError> {
        let creds = self.auth()?;
        let week_index = self.session.week_index.ok_or_else(|| {
            KamarError::state("timetable requested before attendance established the week index")
        })?;

        let (cmd, expected) = if creds.auth_level == TEACHER_AUTH_LEVEL {
            (
                Command::new("GetTeacherTimetable")
                    .field("Tchr", &creds.username)
                    .field("Grid", &self.session.timetable_grid_id),
                "TeacherTimetableResults",
            )
        } else {
            (
                Command::new("GetStudentTimetable")
                    .field("StudentID", &creds.username)
                    .field("Grid", &self.session.timetable_grid_id),
                "StudentTimetableResults",
            )
        };

        let env = dispatch(&self.session, &*self.transport, &creds.key, &cmd).await?;
        let env = Self::expect(env, expected)?;
        decode_timetable(&env.body, week_index)
    }

    /// Fetch and decode academic results.
    pub async fn results(&self) -> Result<ResultLevels, KamarError> {
        let creds = self.auth()?;
        let cmd = Command::new("GetStudentResults")
            .field("StudentID", &creds.username)
            .field("Year", self.session.year.to_string());
        let env = dispatch(&self.session, &*self.transport, &creds.key, &cmd).await?;
        let env = Self::expect(env, "StudentResultsResults")?;
        decode_results(&env.body)
    }

    /// Fetch the NCEA qualification summary.
    pub async fn ncea_summary(&self) -> Result<NceaSummary, KamarError> {
        let creds = self.auth()?;
        let cmd = Command::new("GetStudentNCEASummary").field("StudentID", &creds.username);
        let env = dispatch(&self.session, &*self.transport, &creds.key, &cmd).await?;
        let env = Self::expect(env, "GetStudentNCEASummaryResults")?;
        decode_ncea_summary(&env.body)
    }

    /// Fetch and decode personal details.
    pub async fn personal_details(&self) -> Result<PersonalDetails, KamarError> {
        let creds = self.auth()?;
        let cmd = Command::new("GetStudentDetails")
            .field("StudentID", &creds.username)
            .field("PastoralNotes", "Y");
        let env = dispatch(&self.session, &*self.transport, &creds.key, &cmd).await?;
        let env = Self::expect(env, "GetStudentDetailsResults")?;
        decode_personal_details(&env.body)
    }

    /// Export a decoded personal-details record as a vCard.
    pub fn vcard(&self, details: &PersonalDetails) -> Result<String, KamarError> {
        let creds = self.auth()?;
        Ok(export_vcard(details, &self.session, creds, &creds.username))
    }

    /// Search the student roll.
    pub async fn search_students(
        &self,
        criteria: &str,
    ) -> Result<Vec<StudentMatch>, KamarError> {
        let creds = self.auth()?;
        let cmd = Command::new("SearchStudents").field("Criteria", criteria);
        let env = dispatch(&self.session, &*self.transport, &creds.key, &cmd).await?;
        let env = Self::expect(env, "SearchStudentsResults")?;
        decode_student_search(&env.body)
    }

    /// Fetch the school calendar. Unauthenticated; uses the bootstrap key.
    pub async fn calendar(&self) -> Result<Envelope, KamarError> {
        let cmd = Command::new("GetCalendar").field("Year", self.session.year.to_string());
        dispatch(&self.session, &*self.transport, BOOTSTRAP_KEY, &cmd).await
    }

    /// Raw dispatch for commands with no dedicated decoder. Uses the logon
    /// key when present, the bootstrap key otherwise.
    pub async fn send_command(&self, command: Command) -> Result<Envelope, KamarError> {
        let key = self
            .credentials
            .as_ref()
            .map(|c| c.key.as_str())
            .unwrap_or(BOOTSTRAP_KEY);
        dispatch(&self.session, &*self.transport, key, &command).await
    }

    /// The legacy file-retrieval command is permanently disabled upstream.
    pub async fn file_directory(&self) -> Result<Envelope, KamarError> {
        Err(KamarError::Unsupported("GetFileDirectory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Replays canned response bodies and records the forms it was sent.
    struct Replay {
        bodies: Mutex<Vec<String>>,
        forms: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl Replay {
        fn new(bodies: &[&str]) -> Arc<Self> {
            Arc::new(Replay {
                bodies: Mutex::new(bodies.iter().rev().map(|s| s.to_string()).collect()),
                forms: Mutex::new(Vec::new()),
            })
        }

        fn forms(&self) -> Vec<Vec<(String, String)>> {
            self.forms.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Arc<Replay> {
        async fn send(
            &self,
            _url: &str,
            form: &[(String, String)],
            _user_agent: &str,
        ) -> Result<String, KamarError> {
            self.forms.lock().unwrap().push(form.to_vec());
            self.bodies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| KamarError::Transport("no canned response left".into()))
        }
    }

    fn session() -> Session {
        Session::new("school.example", 2024, "2024TT")
    }

    const LOGON_OK: &str = "<LogonResults><Success>YES</Success><LogonLevel>3</LogonLevel><Key>k9</Key></LogonResults>";

    const ATTENDANCE_3W: &str = r#"<StudentAttendanceResults><Weeks>
        <Week><WeekStart>2024-02-12</WeekStart><Days><Day>PPPPPPP</Day></Days></Week>
        <Week><WeekStart>2024-02-19</WeekStart><Days><Day>PPPPPPP</Day></Days></Week>
        <Week><WeekStart>2024-02-26</WeekStart><Days><Day>PPPPPPP</Day></Days></Week>
    </Weeks></StudentAttendanceResults>"#;

    const TIMETABLE_W3_W4: &str = r#"<StudentTimetableResults><TimetableData>
        <W3><D1>h|A-B-Math-Smith-Room5</D1><D2/><D3/><D4/><D5/></W3>
        <W4><D1>h|A-B-Eng-Jones-</D1><D2/><D3/><D4/><D5/></W4>
    </TimetableData></StudentTimetableResults>"#;

    #[tokio::test]
    async fn test_attendance_then_timetable_sequencing() {
        let _ = env_logger::builder().is_test(true).try_init();
        let transport = Replay::new(&[LOGON_OK, ATTENDANCE_3W, TIMETABLE_W3_W4]);
        let mut client = Kamar::with_transport(session(), Box::new(transport.clone()));

        client.logon("12345", "hunter2").await.unwrap();
        let attendance = client.attendance().await.unwrap();
        assert_eq!(attendance.week_index, 3);
        assert_eq!(client.session().week_index, Some(3));

        let timetable = client.timetable().await.unwrap();
        assert_eq!(timetable.this_week.week_number, 3);
        assert_eq!(timetable.next_week.week_number, 4);
        assert_eq!(timetable.this_week.days["MO"][0].subject, "Math");
        assert_eq!(timetable.next_week.days["MO"][0].location, "Eng");
    }

    #[tokio::test]
    async fn test_timetable_before_attendance_is_state_error() {
        let transport = Replay::new(&[LOGON_OK]);
        let mut client = Kamar::with_transport(session(), Box::new(transport.clone()));
        client.logon("12345", "hunter2").await.unwrap();

        let err = client.timetable().await.unwrap_err();
        assert!(matches!(err, KamarError::State { .. }));
    }

    #[tokio::test]
    async fn test_no_attendance_defaults_week_index_to_one() {
        let transport = Replay::new(&[LOGON_OK, "<StudentAttendanceResults/>"]);
        let mut client = Kamar::with_transport(session(), Box::new(transport.clone()));
        client.logon("12345", "hunter2").await.unwrap();

        let err = client.attendance().await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(client.session().week_index, Some(1));
    }

    #[tokio::test]
    async fn test_teacher_account_uses_teacher_command() {
        let logon = "<LogonResults><Success>YES</Success><LogonLevel>10</LogonLevel><Key>k9</Key></LogonResults>";
        let timetable = TIMETABLE_W3_W4.replace("StudentTimetableResults", "TeacherTimetableResults");
        let transport = Replay::new(&[logon, ATTENDANCE_3W, &timetable]);
        let mut client = Kamar::with_transport(session(), Box::new(transport.clone()));

        client.logon("jsmith", "hunter2").await.unwrap();
        let _ = client.attendance().await.unwrap();
        client.timetable().await.unwrap();

        let forms = transport.forms();
        let timetable_form = &forms[2];
        assert_eq!(timetable_form[0].1, "GetTeacherTimetable");
        assert!(timetable_form.iter().any(|(k, v)| k == "Tchr" && v == "jsmith"));
        assert!(timetable_form.iter().any(|(k, v)| k == "Grid" && v == "2024TT"));
    }

    #[tokio::test]
    async fn test_authenticated_commands_require_logon() {
        let client = Kamar::with_transport(session(), Box::new(Replay::new(&[])));
        let err = client.results().await.unwrap_err();
        assert!(matches!(err, KamarError::State { .. }));
    }

    #[tokio::test]
    async fn test_calendar_remote_error_code_reaches_caller() {
        let transport = Replay::new(&[
            "<GetCalendarResults><Error>Calendar not published</Error><ErrorCode>7</ErrorCode></GetCalendarResults>",
        ]);
        let client = Kamar::with_transport(session(), Box::new(transport.clone()));
        match client.calendar().await.unwrap_err() {
            KamarError::Remote { code, .. } => assert_eq!(code, 7),
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_directory_is_unsupported_without_dispatch() {
        let client = Kamar::with_transport(session(), Box::new(Replay::new(&[])));
        let err = client.file_directory().await.unwrap_err();
        assert!(matches!(err, KamarError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_logon_uses_bootstrap_key() {
        let transport = Replay::new(&[LOGON_OK]);
        let mut client = Kamar::with_transport(session(), Box::new(transport.clone()));
        client.logon("12345", "hunter2").await.unwrap();

        let forms = transport.forms();
        assert!(forms[0]
            .iter()
            .any(|(k, v)| k == "Key" && v == BOOTSTRAP_KEY));
    }

    #[tokio::test]
    async fn test_send_command_key_follows_logon_state() {
        let notices = "<GetNoticesResults><NumberRecords>2</NumberRecords></GetNoticesResults>";
        let transport = Replay::new(&[notices, LOGON_OK, notices]);
        let mut client = Kamar::with_transport(session(), Box::new(transport.clone()));

        let env = client
            .send_command(Command::new("GetNotices").field("Date", "2024-03-01"))
            .await
            .unwrap();
        assert_eq!(env.result_key, "GetNoticesResults");
        assert_eq!(env.body.leaf("NumberRecords"), Some("2"));

        client.logon("12345", "hunter2").await.unwrap();
        client
            .send_command(Command::new("GetNotices").field("Date", "2024-03-01"))
            .await
            .unwrap();

        let forms = transport.forms();
        assert!(forms[0]
            .iter()
            .any(|(k, v)| k == "Key" && v == BOOTSTRAP_KEY));
        assert!(forms[2].iter().any(|(k, v)| k == "Key" && v == "k9"));
    }

    #[tokio::test]
    async fn test_mismatched_result_key_is_decode_error() {
        let transport = Replay::new(&[LOGON_OK, "<SomethingElse><X>1</X></SomethingElse>"]);
        let mut client = Kamar::with_transport(session(), Box::new(transport.clone()));
        client.logon("12345", "hunter2").await.unwrap();
        let err = client.results().await.unwrap_err();
        assert!(matches!(err, KamarError::Decode { .. }));
    }
}
