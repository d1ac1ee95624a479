use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name to trimmed, non-empty value, as pulled out of a form message.
pub type FieldMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Absence,
    TeacherContact,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsenceRequest {
    pub alumne: String,
    pub curs: String,
    pub data: String,
    pub motiu: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherContactRequest {
    pub professor: String,
    pub assumpte: String,
    pub missatge: String,
    pub disponibilitat: Option<String>,
}

fn required<'a>(
    fields: &'a FieldMap,
    key: &'static str,
    missing: &mut Vec<&'static str>,
) -> &'a str {
    match fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(value) => value,
        None => {
            missing.push(key);
            ""
        }
    }
}

fn present(value: &str, key: &'static str, missing: &mut Vec<&'static str>) {
    if value.trim().is_empty() {
        missing.push(key);
    }
}

impl AbsenceRequest {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, MissingFields> {
        let mut missing = Vec::new();
        let request = AbsenceRequest {
            alumne: required(fields, "alumne", &mut missing).to_string(),
            curs: required(fields, "curs", &mut missing).to_string(),
            data: required(fields, "data", &mut missing).to_string(),
            motiu: required(fields, "motiu", &mut missing).to_string(),
        };
        if missing.is_empty() {
            Ok(request)
        } else {
            Err(MissingFields(missing))
        }
    }

    /// Same request with every value trimmed.
    pub fn normalized(self) -> Self {
        AbsenceRequest {
            alumne: self.alumne.trim().to_string(),
            curs: self.curs.trim().to_string(),
            data: self.data.trim().to_string(),
            motiu: self.motiu.trim().to_string(),
        }
    }

    /// Checks a request built from a JSON body, where absent fields arrive empty.
    pub fn validate(&self) -> Result<(), MissingFields> {
        let mut missing = Vec::new();
        present(&self.alumne, "alumne", &mut missing);
        present(&self.curs, "curs", &mut missing);
        present(&self.data, "data", &mut missing);
        present(&self.motiu, "motiu", &mut missing);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingFields(missing))
        }
    }
}

impl TeacherContactRequest {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, MissingFields> {
        let mut missing = Vec::new();
        let request = TeacherContactRequest {
            professor: required(fields, "professor", &mut missing).to_string(),
            assumpte: required(fields, "assumpte", &mut missing).to_string(),
            missatge: required(fields, "missatge", &mut missing).to_string(),
            disponibilitat: fields
                .get("disponibilitat")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        };
        if missing.is_empty() {
            Ok(request)
        } else {
            Err(MissingFields(missing))
        }
    }

    /// Trims every value; a blank availability becomes `None`.
    pub fn normalized(self) -> Self {
        TeacherContactRequest {
            professor: self.professor.trim().to_string(),
            assumpte: self.assumpte.trim().to_string(),
            missatge: self.missatge.trim().to_string(),
            disponibilitat: self
                .disponibilitat
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        }
    }

    pub fn validate(&self) -> Result<(), MissingFields> {
        let mut missing = Vec::new();
        present(&self.professor, "professor", &mut missing);
        present(&self.assumpte, "assumpte", &mut missing);
        present(&self.missatge, "missatge", &mut missing);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingFields(missing))
        }
    }
}
