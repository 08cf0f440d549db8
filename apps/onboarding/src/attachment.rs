//! File attachments and their preview resources.
//!
//! A slot owns at most one active preview handle at a time. The handle is
//! acquired when an image is attached and released when the attachment is
//! replaced, detached, or the slot is dropped; `take()` semantics make a
//! double release unrepresentable.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileAttachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// An acquired preview resource. Only the registry can mint these.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    url: String,
}

impl PreviewHandle {
    /// Displayable address of the preview resource.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Tracks live preview resources so leaks are observable.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    active: Mutex<HashSet<Uuid>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn acquire(&self, file_name: &str) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.active.lock().expect("preview registry poisoned").insert(id);
        debug!("Acquired preview {id} for {file_name}");
        PreviewHandle {
            id,
            url: format!("preview://{id}"),
        }
    }

    pub fn release(&self, handle: PreviewHandle) {
        let removed = self
            .active
            .lock()
            .expect("preview registry poisoned")
            .remove(&handle.id);
        if removed {
            debug!("Released preview {}", handle.id);
        } else {
            warn!("Released unknown preview handle {}", handle.id);
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().expect("preview registry poisoned").len()
    }
}

/// One named attachment slot (aadhar file, profile picture, company logo...).
#[derive(Debug)]
pub struct AttachmentSlot {
    registry: Arc<PreviewRegistry>,
    file: Option<FileAttachment>,
    preview: Option<PreviewHandle>,
}

impl AttachmentSlot {
    pub fn new(registry: Arc<PreviewRegistry>) -> Self {
        Self {
            registry,
            file: None,
            preview: None,
        }
    }

    /// Attaches a file, releasing any prior preview first. A new preview is
    /// acquired only for image content types; other files display by name.
    pub fn attach(&mut self, file: FileAttachment) {
        if let Some(handle) = self.preview.take() {
            self.registry.release(handle);
        }
        if file.is_image() {
            self.preview = Some(self.registry.acquire(&file.file_name));
        }
        self.file = Some(file);
    }

    /// Clears the slot back to "no file selected", releasing the preview.
    pub fn detach(&mut self) {
        if let Some(handle) = self.preview.take() {
            self.registry.release(handle);
        }
        self.file = None;
    }

    pub fn file(&self) -> Option<&FileAttachment> {
        self.file.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::url)
    }
}

impl Drop for AttachmentSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.preview.take() {
            self.registry.release(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> FileAttachment {
        FileAttachment::new(name, "image/png", Bytes::from_static(b"\x89PNG"))
    }

    fn pdf(name: &str) -> FileAttachment {
        FileAttachment::new(name, "application/pdf", Bytes::from_static(b"%PDF"))
    }

    #[test]
    fn test_attach_image_acquires_preview() {
        let registry = PreviewRegistry::new();
        let mut slot = AttachmentSlot::new(registry.clone());
        slot.attach(image("a.png"));
        assert!(slot.preview_url().unwrap().starts_with("preview://"));
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_attach_non_image_has_no_preview() {
        let registry = PreviewRegistry::new();
        let mut slot = AttachmentSlot::new(registry.clone());
        slot.attach(pdf("cv.pdf"));
        assert!(slot.preview_url().is_none());
        assert_eq!(slot.file().unwrap().file_name, "cv.pdf");
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_replace_releases_old_preview_first() {
        let registry = PreviewRegistry::new();
        let mut slot = AttachmentSlot::new(registry.clone());
        slot.attach(image("a.png"));
        let first = slot.preview_url().unwrap().to_string();
        slot.attach(image("b.png"));
        let second = slot.preview_url().unwrap().to_string();
        assert_ne!(first, second);
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_rapid_attach_detach_never_leaks() {
        let registry = PreviewRegistry::new();
        let mut slot = AttachmentSlot::new(registry.clone());
        for i in 0..20 {
            slot.attach(image(&format!("{i}.png")));
            if i % 3 == 0 {
                slot.detach();
            }
        }
        assert!(registry.active_count() <= 1);
        slot.detach();
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_detach_clears_file() {
        let registry = PreviewRegistry::new();
        let mut slot = AttachmentSlot::new(registry.clone());
        slot.attach(image("a.png"));
        slot.detach();
        assert!(slot.file().is_none());
        assert!(slot.preview_url().is_none());
        // a fresh attach works after detach
        slot.attach(image("b.png"));
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_drop_releases_active_preview() {
        let registry = PreviewRegistry::new();
        {
            let mut slot = AttachmentSlot::new(registry.clone());
            slot.attach(image("a.png"));
            assert_eq!(registry.active_count(), 1);
        }
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_image_replaced_by_pdf_releases_preview() {
        let registry = PreviewRegistry::new();
        let mut slot = AttachmentSlot::new(registry.clone());
        slot.attach(image("a.png"));
        slot.attach(pdf("cv.pdf"));
        assert!(slot.preview_url().is_none());
        assert_eq!(registry.active_count(), 0);
    }
}
