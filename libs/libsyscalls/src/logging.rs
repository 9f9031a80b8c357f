use core::fmt::{self, Write};

use log::{LevelFilter, Metadata, Record};

use super::{Builtin, Message, SyscallResult, syscalls::*, sysret_to_unit};

/// Print one byte on the kernel debug console
pub fn write_byte(byte: u8) -> SyscallResult<()> {
    let ret = unsafe { syscall1(Message::send(Builtin::Write.code()).as_raw(), byte as u64) };

    sysret_to_unit(ret)
}

/// Print bytes on the kernel debug console, one kernel entry each
pub fn write(bytes: &[u8]) -> SyscallResult<()> {
    for &byte in bytes {
        write_byte(byte)?;
    }

    Ok(())
}

struct DebugConsole;

impl Write for DebugConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

struct KernelLogger;

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(DebugConsole, "{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: KernelLogger = KernelLogger;

/// Route the `log` facade to the kernel debug console
pub fn init(level: LevelFilter) {
    // Note: if set logger fails, another logger is already installed and keeps working
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Kernel};

    #[test]
    fn bytes_reach_debug_console() {
        mock::install(Kernel::new());

        write(b"boot\n").unwrap();

        mock::with(|kernel| {
            assert_eq!(kernel.debug_output(), b"boot\n");
            assert_eq!(kernel.entries().len(), 5);
            assert_eq!(kernel.entries()[0].rdi, b'b' as u64);
        });
    }

    #[test]
    fn formatted_line() {
        mock::install(Kernel::new());

        writeln!(DebugConsole, "{} - {}", log::Level::Warn, "disk slow").unwrap();

        assert_eq!(
            mock::with(|kernel| kernel.debug_output().to_vec()),
            b"WARN - disk slow\n"
        );
    }
}
