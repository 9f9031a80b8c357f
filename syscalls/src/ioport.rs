use bitflags::bitflags;

bitflags! {
    /// Direction and operand width of a port access
    #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
    pub struct PortIoFlags: u64 {
        /// 8 bits
        const BYTE = 0x01;

        /// 16 bits
        const WORD = 0x02;

        /// 32 bits
        const DWORD = 0x04;

        /// Output, read when not set
        const WRITE = 0x10;
    }
}
