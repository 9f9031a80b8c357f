//! Framebuffer client. The present protocol is provisional: nothing tells the client when a
//! presented frame is released.

use syscalls::framebuffer::{FramebufferMessage, PaletteEntry, VideoMode};

use super::{Handle, Message, SyscallResult, ipc};

pub fn set_video_mode(fb: Handle, mode: VideoMode) -> SyscallResult<()> {
    let (mut size, mut bpp) = mode.to_args();
    ipc::call2(
        Message::call(FramebufferMessage::SetVideoMode as u8),
        fb,
        &mut size,
        &mut bpp,
    )?;

    Ok(())
}

pub fn set_palette(fb: Handle, entry: PaletteEntry) -> SyscallResult<()> {
    let mut arg = entry.to_arg();
    ipc::call1(Message::call(FramebufferMessage::SetPalette as u8), fb, &mut arg)?;

    Ok(())
}

/// Present the frame starting at `offset` in the mapped framebuffer
pub fn present(fb: Handle, offset: u64) -> SyscallResult<()> {
    ipc::send1(Message::send(FramebufferMessage::Present as u8), fb, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Kernel, MockFramebuffer};

    const FB: Handle = Handle::from_raw(0x90);

    fn boot() -> MockFramebuffer {
        let fb = MockFramebuffer::new();
        let mut kernel = Kernel::new();
        kernel.attach(FB, fb.clone());
        mock::install(kernel);
        fb
    }

    #[test]
    fn configure_and_present() {
        let fb = boot();
        let mode = VideoMode {
            width: 640,
            height: 480,
            bpp: 8,
        };
        let entry = PaletteEntry {
            index: 1,
            r: 0xff,
            g: 0x80,
            b: 0,
        };

        set_video_mode(FB, mode).unwrap();
        set_palette(FB, entry).unwrap();
        present(FB, mode.frame_size().unwrap() as u64).unwrap();

        assert_eq!(fb.mode(), Some(mode));
        assert_eq!(fb.palette(1), Some(entry));
        assert_eq!(fb.presented(), [640 * 480]);
    }

    #[test]
    fn present_does_not_wait() {
        boot();

        present(FB, 0).unwrap();

        let entry = mock::with(|kernel| *kernel.last_entry().unwrap());
        assert_eq!(
            entry.message(),
            Message::send(FramebufferMessage::Present as u8)
        );
    }
}
