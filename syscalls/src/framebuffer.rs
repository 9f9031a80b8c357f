//! Framebuffer protocol
//!
//! The client maps the framebuffer handle itself, as much memory as the mode needs
//! (or more, to present frames from an offset).

use crate::Builtin;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferMessage {
    /// Set video mode (size and bpp).
    ///
    /// arg1: width << 32 | height
    /// arg2: bits per pixel
    SetVideoMode = Builtin::USER,

    /// For 4- or 8-bit modes, update a palette entry.
    ///
    /// arg1: index << 24 | r << 16 | g << 8 | b
    SetPalette,

    /// Present a frame.
    ///
    /// arg1: origin of the frame, relative to the mapped memory area.
    ///
    /// Provisional: there is no way yet for the client to learn when the frame has been
    /// presented and the previous one is released.
    Present,
}

impl FramebufferMessage {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            16 => Some(Self::SetVideoMode),
            17 => Some(Self::SetPalette),
            18 => Some(Self::Present),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMode {
    pub width: u32,
    pub height: u32,
    pub bpp: u8,
}

impl VideoMode {
    /// (arg1, arg2)
    pub const fn to_args(self) -> (u64, u64) {
        (
            (self.width as u64) << 32 | self.height as u64,
            self.bpp as u64,
        )
    }

    pub const fn from_args(size: u64, bpp: u64) -> Self {
        Self {
            width: (size >> 32) as u32,
            height: size as u32,
            bpp: bpp as u8,
        }
    }

    /// Bytes needed to map one frame in this mode, `None` if it does not fit the address space
    pub const fn frame_size(self) -> Option<usize> {
        let bits = self.width as u128 * self.height as u128 * self.bpp as u128;
        let bytes = bits.div_ceil(8);
        if bytes > usize::MAX as u128 {
            None
        } else {
            Some(bytes as usize)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub index: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PaletteEntry {
    pub const fn to_arg(self) -> u64 {
        (self.index as u64) << 24 | (self.r as u64) << 16 | (self.g as u64) << 8 | self.b as u64
    }

    pub const fn from_arg(arg: u64) -> Self {
        Self {
            index: (arg >> 24) as u8,
            r: (arg >> 16) as u8,
            g: (arg >> 8) as u8,
            b: arg as u8,
        }
    }
}
