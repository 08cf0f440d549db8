//! The terminal registration artifact.
//!
//! Assembled once, at final submission, by flattening the wizard's collected
//! fields plus any attachments into a single multipart body. Array fields
//! (`education`, `experiences`) arrive here already serialized to JSON
//! strings; the payload is handed to the gateway and not retained.

use std::collections::BTreeMap;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};

#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationPayload {
    pub fields: BTreeMap<String, String>,
    pub files: Vec<FilePart>,
}

impl RegistrationPayload {
    /// Builds the multipart/form-data body: scalar fields as text parts,
    /// files as binary parts under their fixed field names.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let part = Part::bytes(file.data.to_vec())
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_form_accepts_fields_and_files() {
        let mut payload = RegistrationPayload::default();
        payload.fields.insert("email".into(), "a@b.com".into());
        payload
            .fields
            .insert("experiences".into(), "Fresher".into());
        payload.files.push(FilePart {
            field: "profilePic".into(),
            file_name: "me.png".into(),
            content_type: "image/png".into(),
            data: Bytes::from_static(b"\x89PNG"),
        });
        assert!(payload.into_form().is_ok());
    }

    #[test]
    fn test_into_form_rejects_malformed_content_type() {
        let mut payload = RegistrationPayload::default();
        payload.files.push(FilePart {
            field: "profilePic".into(),
            file_name: "me.png".into(),
            content_type: "not a mime".into(),
            data: Bytes::new(),
        });
        assert!(payload.into_form().is_err());
    }
}
