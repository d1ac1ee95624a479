//! Plain-text form messages produced by the chat frontend.
//!
//! The frontend serializes its two forms into single chat lines:
//!
//! ```text
//! Justificar falta - Alumne: X, Curs: Y, Data: Z, Motiu: W
//! Contactar professor <name> - Assumpte: <s>, Missatge: <m>, Disponibilitat: <a>
//! ```
//!
//! Parsing is positional and depends on the exact labels and their order. A
//! comma inside a value cuts it short. The typed `/api/forms/*` endpoints
//! avoid this and should be preferred by new clients.

use chrono::{DateTime, Local};

use crate::config::SCHOOL_NAME;
use crate::models::form::{AbsenceRequest, FieldMap, FormKind, TeacherContactRequest};
use crate::services::mail_service::OutgoingMail;

const FORM_MARKERS: [&str; 4] = [
    "Justificar falta - Alumne:",
    "Contactar professor",
    "- Assumpte:",
    "Missatge:",
];

const ABSENCE_LINE: &str = "Justificar falta - Alumne:";
const ABSENCE_PREFIX: &str = "Justificar falta - ";
const TEACHER_PREFIX: &str = "Contactar professor ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Form(FormKind),
    UnrecognizedForm,
    Question,
}

/// Sender details added to outgoing mail.
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub name: String,
    pub contact: String,
}

pub fn is_form(text: &str) -> bool {
    FORM_MARKERS.iter().any(|marker| text.contains(marker))
}

pub fn route(text: &str) -> Route {
    if !is_form(text) {
        Route::Question
    } else if text.contains("Justificar falta") {
        Route::Form(FormKind::Absence)
    } else if text.contains("Contactar professor") {
        Route::Form(FormKind::TeacherContact)
    } else {
        Route::UnrecognizedForm
    }
}

pub fn extract_fields(text: &str, kind: FormKind) -> FieldMap {
    match kind {
        FormKind::Absence => extract_absence(text),
        FormKind::TeacherContact => extract_teacher_contact(text),
    }
}

fn insert_trimmed(fields: &mut FieldMap, key: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        fields.insert(key.to_string(), value.to_string());
    }
}

fn extract_absence(text: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    let Some(line) = text
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(ABSENCE_LINE))
    else {
        return fields;
    };

    let rest = line.strip_prefix(ABSENCE_PREFIX).unwrap_or(line);
    for part in rest.split(", ") {
        let part = part.trim();
        for (label, key) in [
            ("Alumne:", "alumne"),
            ("Curs:", "curs"),
            ("Data:", "data"),
            ("Motiu:", "motiu"),
        ] {
            if let Some(value) = part.strip_prefix(label) {
                insert_trimmed(&mut fields, key, value);
                break;
            }
        }
    }
    fields
}

/// Text between `start_label` and the first of `terminators` after it, or the end.
fn slice_after<'a>(text: &'a str, start_label: &str, terminators: &[&str]) -> Option<&'a str> {
    let start = text.find(start_label)? + start_label.len();
    let rest = &text[start..];
    let end = terminators
        .iter()
        .filter_map(|t| rest.find(t))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn extract_teacher_contact(text: &str) -> FieldMap {
    let mut fields = FieldMap::new();

    if let Some(start) = text.find(TEACHER_PREFIX).map(|i| i + TEACHER_PREFIX.len()) {
        if let Some(end) = text[start..].find(" - Assumpte:") {
            insert_trimmed(&mut fields, "professor", &text[start..start + end]);
        }
    }
    if let Some(subject) = slice_after(text, "Assumpte: ", &[",", "\n"]) {
        insert_trimmed(&mut fields, "assumpte", subject);
    }
    if let Some(message) = slice_after(text, "Missatge: ", &[", Disponibilitat:"]) {
        insert_trimmed(&mut fields, "missatge", message);
    }
    if let Some(availability) = slice_after(text, "Disponibilitat: ", &["\n"]) {
        insert_trimmed(&mut fields, "disponibilitat", availability);
    }
    fields
}

fn signature(user: &UserContext, sent_at: DateTime<Local>) -> String {
    format!(
        "Atentament,\n{}\nContacte: {}\n\n---\nEnviat automàticament des del sistema de l'{}\n{}",
        user.name,
        user.contact,
        SCHOOL_NAME,
        sent_at.format("%d/%m/%Y %H:%M")
    )
}

pub fn absence_mail(
    request: &AbsenceRequest,
    user: &UserContext,
    recipient: &str,
    sent_at: DateTime<Local>,
) -> OutgoingMail {
    let body = format!(
        "Benvolguts,\n\nSol·licito justificar la falta d'assistència següent:\n\n\
         Alumne/a: {}\nCurs: {}\nData de la falta: {}\nMotiu: {}\n\n{}",
        request.alumne,
        request.curs,
        request.data,
        request.motiu,
        signature(user, sent_at)
    );
    OutgoingMail {
        subject: format!("Justificació de falta - {} ({})", request.alumne, request.curs),
        body,
        recipients: vec![recipient.to_string()],
    }
}

pub fn teacher_contact_mail(
    request: &TeacherContactRequest,
    user: &UserContext,
    recipient: &str,
    sent_at: DateTime<Local>,
) -> OutgoingMail {
    let availability = request
        .disponibilitat
        .as_deref()
        .map(|a| format!("\n\nDisponibilitat: {}", a))
        .unwrap_or_default();
    let body = format!(
        "Benvolgut/da {},\n\n{}{}\n\n{}",
        request.professor,
        request.missatge,
        availability,
        signature(user, sent_at)
    );
    OutgoingMail {
        subject: format!("{} - {}", request.assumpte, user.name),
        body,
        recipients: vec![recipient.to_string()],
    }
}
