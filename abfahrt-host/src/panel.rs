//! PBM file panel
//!
//! Stands in for the e-paper controller: every refresh writes the frame
//! buffer to a binary PBM image, so the board can be watched with any
//! image viewer that reloads on change.

use std::fs;
use std::io;
use std::path::PathBuf;

use abfahrt_core::render::{Rect, HEIGHT, WIDTH};
use abfahrt_core::traits::CommitKind;
use abfahrt_display::{Panel, PanelError};
use tracing::{debug, info, warn};

/// Encode a frame buffer as binary PBM (P4)
///
/// PBM uses a set bit for black, the frame buffer a set bit for white.
pub fn encode_pbm(frame: &[u8]) -> Vec<u8> {
    let header = format!("P4\n{} {}\n", WIDTH, HEIGHT);
    let mut out = Vec::with_capacity(header.len() + frame.len());
    out.extend_from_slice(header.as_bytes());
    out.extend(frame.iter().map(|byte| !byte));
    out
}

/// Panel writing each refresh to an image file
pub struct PbmPanel {
    path: PathBuf,
    full_refreshes: u32,
    partial_refreshes: u32,
}

impl PbmPanel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            full_refreshes: 0,
            partial_refreshes: 0,
        }
    }

    pub fn full_refreshes(&self) -> u32 {
        self.full_refreshes
    }

    pub fn partial_refreshes(&self) -> u32 {
        self.partial_refreshes
    }

    /// Write via a temporary file so viewers never see half an image
    fn write(&self, frame: &[u8]) -> io::Result<()> {
        let tmp = self.path.with_extension("pbm.tmp");
        fs::write(&tmp, encode_pbm(frame))?;
        fs::rename(&tmp, &self.path)
    }
}

impl Panel for PbmPanel {
    fn refresh(&mut self, frame: &[u8], area: Rect, kind: CommitKind) -> Result<(), PanelError> {
        self.write(frame).map_err(|e| {
            warn!("panel: writing {} failed: {}", self.path.display(), e);
            PanelError::Communication
        })?;

        match kind {
            CommitKind::Full => {
                self.full_refreshes += 1;
                info!("panel: full refresh #{}", self.full_refreshes);
            }
            CommitKind::Partial => {
                self.partial_refreshes += 1;
                debug!(
                    "panel: partial refresh {}x{} at ({}, {})",
                    area.w, area.h, area.x, area.y
                );
            }
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abfahrt_display::BUFFER_SIZE;

    #[test]
    fn test_pbm_header_and_inversion() {
        let mut frame = vec![0xFF; BUFFER_SIZE];
        frame[0] = 0x7F;
        let pbm = encode_pbm(&frame);
        let header = b"P4\n400 300\n";
        assert_eq!(&pbm[..header.len()], header);
        assert_eq!(pbm.len(), header.len() + BUFFER_SIZE);
        assert_eq!(pbm[header.len()], 0x80);
        assert_eq!(pbm[header.len() + 1], 0x00);
    }

    #[test]
    fn test_refresh_writes_file() {
        let dir = std::env::temp_dir().join(format!("abfahrt-pbm-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frame.pbm");

        let mut panel = PbmPanel::new(&path);
        let frame = vec![0xFF; BUFFER_SIZE];
        panel.refresh(&frame, Rect::screen(), CommitKind::Full).unwrap();
        panel
            .refresh(&frame, Rect::new(0, 0, 8, 8), CommitKind::Partial)
            .unwrap();

        assert_eq!(panel.full_refreshes(), 1);
        assert_eq!(panel.partial_refreshes(), 1);
        let written = fs::read(&path).unwrap();
        assert!(written.starts_with(b"P4\n"));
        assert!(!path.with_extension("pbm.tmp").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unwritable_path_is_communication_error() {
        let mut panel = PbmPanel::new("/nonexistent-dir/abfahrt/frame.pbm");
        let frame = vec![0xFF; BUFFER_SIZE];
        assert_eq!(
            panel.refresh(&frame, Rect::screen(), CommitKind::Full),
            Err(PanelError::Communication)
        );
    }
}
