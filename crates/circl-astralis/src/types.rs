// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire DTOs and the domain types they map to.
//!
//! The backend speaks snake_case JSON. Every `*Dto` struct here mirrors a
//! wire shape exactly and converts into its domain type via `From`; no
//! other crate touches the wire spelling.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

// --- Streamed frame envelope ---

/// One JSON event as carried on a `data:` line.
///
/// `message` is a string for text events and an object or array for
/// `users_found`, so it stays a raw value until dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFrame {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub message: serde_json::Value,
}

// --- Found user (results panel) ---

/// Wire shape of one discovered professional profile.
#[derive(Debug, Clone, Deserialize)]
pub struct FoundUserDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experiences: Vec<ExperienceDto>,
    #[serde(default)]
    pub educations: Vec<EducationDto>,
}

/// Wire shape of one work experience entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceDto {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Wire shape of one education entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EducationDto {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub enrollment_date: Option<String>,
    #[serde(default)]
    pub graduation_date: Option<String>,
}

/// A professional profile surfaced mid-stream, as shown in the results panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundUser {
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub pfp_url: Option<String>,
    pub skills: Vec<String>,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
}

/// One work experience entry of a found user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// One education entry of a found user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub enrollment_date: Option<String>,
    pub graduation_date: Option<String>,
}

impl FoundUser {
    /// Experiences ordered most recent first (by start date, then end date).
    pub fn sorted_experiences(&self) -> Vec<Experience> {
        let mut sorted = self.experiences.clone();
        sorted.sort_by(|a, b| {
            let key_a = (parse_loose_date(&a.start_date), parse_loose_date(&a.end_date));
            let key_b = (parse_loose_date(&b.start_date), parse_loose_date(&b.end_date));
            key_b.cmp(&key_a)
        });
        sorted
    }

    /// Educations ordered most recent first (by enrollment, then graduation).
    pub fn sorted_educations(&self) -> Vec<Education> {
        let mut sorted = self.educations.clone();
        sorted.sort_by(|a, b| {
            let key_a = (
                parse_loose_date(&a.enrollment_date),
                parse_loose_date(&a.graduation_date),
            );
            let key_b = (
                parse_loose_date(&b.enrollment_date),
                parse_loose_date(&b.graduation_date),
            );
            key_b.cmp(&key_a)
        });
        sorted
    }
}

/// Parses `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`. Absent or unparseable dates
/// sort to the distant past so entries without dates land last.
fn parse_loose_date(date: &Option<String>) -> NaiveDate {
    let fallback = NaiveDate::from_ymd_opt(1, 1, 1).expect("valid constant date");
    let Some(date) = date else {
        return fallback;
    };
    let mut parts = date.split('-');
    let year = parts.next().and_then(|p| p.parse::<i32>().ok());
    let month = parts.next().and_then(|p| p.parse::<u32>().ok()).unwrap_or(1);
    let day = parts.next().and_then(|p| p.parse::<u32>().ok()).unwrap_or(1);
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day).unwrap_or(fallback),
        None => fallback,
    }
}

impl From<ExperienceDto> for Experience {
    fn from(dto: ExperienceDto) -> Self {
        Self {
            job_title: dto.job_title,
            company_name: dto.company_name,
            location: dto.location,
            start_date: dto.start_date,
            end_date: dto.end_date,
        }
    }
}

impl From<EducationDto> for Education {
    fn from(dto: EducationDto) -> Self {
        Self {
            school: dto.school,
            degree: dto.degree,
            enrollment_date: dto.enrollment_date,
            graduation_date: dto.graduation_date,
        }
    }
}

impl From<FoundUserDto> for FoundUser {
    fn from(dto: FoundUserDto) -> Self {
        Self {
            name: dto.name,
            title: dto.title,
            company: dto.company,
            pfp_url: dto.pfp_url,
            skills: dto.skills,
            experiences: dto.experiences.into_iter().map(Experience::from).collect(),
            educations: dto.educations.into_iter().map(Education::from).collect(),
        }
    }
}

// --- Sessions ---

/// Wire shape of one persisted session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDto {
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A persisted conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SessionDto> for Session {
    fn from(dto: SessionDto) -> Self {
        Self {
            session_id: dto.session_id,
            user_id: dto.user_id,
            // Empty titles stay pending until the server patches one in.
            title: dto.title.filter(|t| !t.is_empty()),
            created_at: parse_timestamp(dto.created_at.as_deref()),
        }
    }
}

/// Wire shape of one persisted message.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredMessageDto {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A message reloaded from the server for a selected session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub message_id: Option<String>,
    pub session_id: Option<String>,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredMessageDto> for StoredMessage {
    fn from(dto: StoredMessageDto) -> Self {
        Self {
            message_id: dto.message_id,
            session_id: dto.session_id,
            role: dto.role,
            content: dto.content,
            created_at: parse_timestamp(dto.created_at.as_deref()),
        }
    }
}

/// Response body of `POST {sessions}`.
#[derive(Debug, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Response body of `GET {sessions}/{id}/messages`.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<StoredMessageDto>,
}

/// Response body of `POST {astralis}/summarize`.
#[derive(Debug, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Parses an RFC 3339 timestamp, degrading to the epoch (so a session with
/// a mangled timestamp sorts last rather than poisoning the list).
fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    match raw {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                warn!(raw, error = %e, "unparseable timestamp from server");
                DateTime::UNIX_EPOCH
            }
        },
        None => DateTime::UNIX_EPOCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_dto_maps_snake_case_wire() {
        let json = r#"{
            "session_id": "s-1",
            "user_id": "u-1",
            "title": "ML engineers in Berlin",
            "created_at": "2026-03-01T12:00:00Z"
        }"#;
        let dto: SessionDto = serde_json::from_str(json).unwrap();
        let session = Session::from(dto);
        assert_eq!(session.session_id.as_deref(), Some("s-1"));
        assert_eq!(session.title.as_deref(), Some("ML engineers in Berlin"));
        assert_eq!(session.created_at.to_rfc3339(), "2026-03-01T12:00:00+00:00");
    }

    #[test]
    fn empty_title_maps_to_pending() {
        let dto: SessionDto =
            serde_json::from_str(r#"{"session_id": "s-1", "title": ""}"#).unwrap();
        let session = Session::from(dto);
        assert!(session.title.is_none());
    }

    #[test]
    fn bad_timestamp_degrades_to_epoch() {
        let dto: SessionDto =
            serde_json::from_str(r#"{"session_id": "s-1", "created_at": "yesterday"}"#).unwrap();
        let session = Session::from(dto);
        assert_eq!(session.created_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn found_user_dto_maps_nested_entries() {
        let json = r#"{
            "name": "Sarah Chen",
            "title": "Senior Data Scientist",
            "company": "TechCorp",
            "pfp_url": "https://cdn.example.com/sc.png",
            "skills": ["ML", "Python"],
            "experiences": [
                {"job_title": "Data Scientist", "company_name": "TechCorp", "start_date": "2022-05-01"}
            ],
            "educations": [
                {"school": "MIT", "enrollment_date": "2014-09", "graduation_date": "2018-06"}
            ]
        }"#;
        let dto: FoundUserDto = serde_json::from_str(json).unwrap();
        let user = FoundUser::from(dto);
        assert_eq!(user.name.as_deref(), Some("Sarah Chen"));
        assert_eq!(user.skills.len(), 2);
        assert_eq!(user.experiences[0].job_title.as_deref(), Some("Data Scientist"));
        assert_eq!(user.educations[0].school.as_deref(), Some("MIT"));
    }

    #[test]
    fn experiences_sort_most_recent_first() {
        let user = FoundUser {
            name: None,
            title: None,
            company: None,
            pfp_url: None,
            skills: vec![],
            experiences: vec![
                Experience {
                    job_title: Some("old".into()),
                    company_name: None,
                    location: None,
                    start_date: Some("2015-01-01".into()),
                    end_date: Some("2018-01-01".into()),
                },
                Experience {
                    job_title: Some("current".into()),
                    company_name: None,
                    location: None,
                    start_date: Some("2022-05".into()),
                    end_date: None,
                },
                Experience {
                    job_title: Some("undated".into()),
                    company_name: None,
                    location: None,
                    start_date: None,
                    end_date: None,
                },
            ],
            educations: vec![],
        };
        let sorted = user.sorted_experiences();
        assert_eq!(sorted[0].job_title.as_deref(), Some("current"));
        assert_eq!(sorted[1].job_title.as_deref(), Some("old"));
        assert_eq!(sorted[2].job_title.as_deref(), Some("undated"));
    }

    #[test]
    fn experiences_tie_on_start_break_on_end() {
        let make = |title: &str, end: Option<&str>| Experience {
            job_title: Some(title.into()),
            company_name: None,
            location: None,
            start_date: Some("2020-01-01".into()),
            end_date: end.map(String::from),
        };
        let user = FoundUser {
            name: None,
            title: None,
            company: None,
            pfp_url: None,
            skills: vec![],
            experiences: vec![make("short", Some("2020-06-01")), make("long", Some("2023-06-01"))],
            educations: vec![],
        };
        let sorted = user.sorted_experiences();
        assert_eq!(sorted[0].job_title.as_deref(), Some("long"));
    }

    #[test]
    fn messages_response_defaults_to_empty() {
        let resp: MessagesResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.messages.is_empty());
    }

    #[test]
    fn raw_frame_tolerates_missing_message() {
        let frame: RawFrame = serde_json::from_str(r#"{"type": "end"}"#).unwrap();
        assert_eq!(frame.type_, "end");
        assert!(frame.message.is_null());
    }
}
