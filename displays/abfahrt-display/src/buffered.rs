//! Buffered display driver
//!
//! Paints region writes into a local frame buffer and pushes it to the
//! panel on commit, together with the area touched since the last
//! successful commit.

use abfahrt_core::error::HardwareError;
use abfahrt_core::render::{Rect, RegionWrite};
use abfahrt_core::traits::{CommitKind, DisplayDriver};
use log::{debug, warn};

use crate::backend::Panel;
use crate::framebuffer::FrameBuffer;
use crate::paint::paint;

/// `DisplayDriver` backed by a frame buffer and a [`Panel`]
pub struct BufferedDisplay<P: Panel> {
    frame: FrameBuffer,
    panel: P,
    /// Area written since the last successful commit
    dirty: Rect,
}

impl<P: Panel> BufferedDisplay<P> {
    /// Create a driver with a white buffer
    pub fn new(panel: P) -> Self {
        Self {
            frame: FrameBuffer::new(),
            panel,
            dirty: Rect::new(0, 0, 0, 0),
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Area waiting to be pushed, if any
    pub fn dirty(&self) -> Option<Rect> {
        if self.dirty.is_empty() {
            None
        } else {
            Some(self.dirty)
        }
    }
}

impl<P: Panel> DisplayDriver for BufferedDisplay<P> {
    fn write_region(&mut self, write: &RegionWrite) -> Result<(), HardwareError> {
        match paint(&mut self.frame, write) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        self.dirty = self.dirty.union(&write.rect);
        Ok(())
    }

    fn commit(&mut self, kind: CommitKind) -> Result<(), HardwareError> {
        if !self.panel.is_ready() {
            warn!("display: panel busy, commit deferred");
            return Err(HardwareError::Busy);
        }

        let area = match kind {
            CommitKind::Full => Rect::screen(),
            CommitKind::Partial if self.dirty.is_empty() => {
                debug!("display: nothing to commit");
                return Ok(());
            }
            CommitKind::Partial => self.dirty,
        };

        // Dirty area stays put on failure so a retry pushes it again
        self.panel.refresh(self.frame.as_bytes(), area, kind)?;
        debug!(
            "display: {:?} commit {}x{} at ({}, {})",
            kind, area.w, area.h, area.x, area.y
        );
        self.dirty = Rect::new(0, 0, 0, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PanelError;
    use abfahrt_core::render::DrawOp;

    /// Records the last refresh and fails on demand
    #[derive(Default)]
    struct MockPanel {
        busy: bool,
        fail: Option<PanelError>,
        refreshes: usize,
        last: Option<(Rect, CommitKind)>,
        last_first_byte: Option<u8>,
    }

    impl Panel for MockPanel {
        fn refresh(
            &mut self,
            frame: &[u8],
            area: Rect,
            kind: CommitKind,
        ) -> Result<(), PanelError> {
            if let Some(err) = self.fail {
                return Err(err);
            }
            self.refreshes += 1;
            self.last = Some((area, kind));
            self.last_first_byte = frame.first().copied();
            Ok(())
        }

        fn is_ready(&self) -> bool {
            !self.busy
        }
    }

    fn fill(x: u16, y: u16, w: u16, h: u16) -> RegionWrite {
        RegionWrite::new(Rect::new(x, y, w, h), DrawOp::Fill)
    }

    #[test]
    fn test_partial_commit_covers_dirty_union() {
        let mut display = BufferedDisplay::new(MockPanel::default());
        display.write_region(&fill(10, 10, 10, 10)).unwrap();
        display.write_region(&fill(50, 40, 5, 5)).unwrap();
        assert_eq!(display.dirty(), Some(Rect::new(10, 10, 45, 35)));

        display.commit(CommitKind::Partial).unwrap();
        assert_eq!(
            display.panel().last,
            Some((Rect::new(10, 10, 45, 35), CommitKind::Partial))
        );
        assert_eq!(display.dirty(), None);
    }

    #[test]
    fn test_full_commit_covers_screen() {
        let mut display = BufferedDisplay::new(MockPanel::default());
        display.write_region(&fill(0, 0, 8, 1)).unwrap();
        display.commit(CommitKind::Full).unwrap();
        assert_eq!(
            display.panel().last,
            Some((Rect::screen(), CommitKind::Full))
        );
        assert_eq!(display.panel().last_first_byte, Some(0x00));
    }

    #[test]
    fn test_empty_partial_skips_panel() {
        let mut display = BufferedDisplay::new(MockPanel::default());
        display.commit(CommitKind::Partial).unwrap();
        assert_eq!(display.panel().refreshes, 0);
    }

    #[test]
    fn test_busy_panel_keeps_dirty() {
        let mut display = BufferedDisplay::new(MockPanel {
            busy: true,
            ..Default::default()
        });
        display.write_region(&fill(0, 0, 4, 4)).unwrap();
        assert_eq!(display.commit(CommitKind::Partial), Err(HardwareError::Busy));
        assert_eq!(display.dirty(), Some(Rect::new(0, 0, 4, 4)));

        display.panel_mut().busy = false;
        display.commit(CommitKind::Partial).unwrap();
        assert_eq!(display.panel().refreshes, 1);
        assert_eq!(display.dirty(), None);
    }

    #[test]
    fn test_panel_error_maps_to_hardware_error() {
        let mut display = BufferedDisplay::new(MockPanel {
            fail: Some(PanelError::Timeout),
            ..Default::default()
        });
        display.write_region(&fill(0, 0, 4, 4)).unwrap();
        assert_eq!(
            display.commit(CommitKind::Full),
            Err(HardwareError::Timeout)
        );
        assert!(display.dirty().is_some());
    }

    #[test]
    fn test_rendered_screen_draws_status_and_body() {
        use abfahrt_core::animation::AnimationPhase;
        use abfahrt_core::departures::{Connectivity, DisplayModel, Freshness};
        use abfahrt_core::render::{render, DrawKind};

        let model = DisplayModel::empty();
        let writes = render(
            &model,
            Freshness::Error,
            Connectivity::Disconnected,
            AnimationPhase::Visible,
            DrawKind::Full,
        );

        let mut display = BufferedDisplay::new(MockPanel::default());
        for write in &writes {
            display.write_region(write).unwrap();
        }
        display.commit(CommitKind::Full).unwrap();

        let frame = display.frame();
        assert!(frame.ink_in(&Rect::new(0, 0, 400, 24)) > 0);
        assert_eq!(frame.ink_in(&Rect::new(0, 25, 400, 1)), 400);
        assert!(frame.ink_in(&Rect::new(0, 28, 400, 272)) > 0);
    }

    #[test]
    fn test_writes_reach_frame() {
        let mut display = BufferedDisplay::new(MockPanel::default());
        let rect = Rect::new(100, 100, 20, 2);
        display.write_region(&RegionWrite::new(rect, DrawOp::Fill)).unwrap();
        assert_eq!(display.frame().ink_in(&rect), 40);
        display.write_region(&RegionWrite::new(rect, DrawOp::Clear)).unwrap();
        assert_eq!(display.frame().ink_in(&rect), 0);
    }
}
