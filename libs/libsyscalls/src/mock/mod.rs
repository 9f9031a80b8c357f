//! Host kernel simulator
//!
//! Stands in for the kernel behind the `syscall` instruction when testing on the host. Each
//! thread gets its own [`Kernel`], installed with [`install`].
//!
//! It keeps a handle table pointing to [`Peer`] devices, anonymous memory backed by host
//! allocations, a virtual clock and a queue of messages waiting to be received. Every entry is
//! recorded with its input registers so tests can check the exact slot layout.
//!
//! The real kernel blocks forever on a receive with nothing to deliver, or on a call to a peer
//! that does not answer. The simulator panics instead.

use std::{
    alloc::{self, Layout},
    boxed::Box,
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    slice,
    vec::Vec,
};

use syscalls::{
    Builtin, Error, Message, MessageKind, PAGE_SIZE, PortIoFlags, Protection, USER_MAP_MAX,
    page_address, page_align_up,
};

use crate::{Handle, handle::HandleOp};

mod devices;

pub use devices::*;

/// Value left in registers the kernel clobbers
pub const CLOBBER: u64 = 0x5a5a_5a5a_5a5a_5a5a;

/// Register file at kernel entry and exit
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub rax: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub r8: u64,
    pub r9: u64,
}

impl Registers {
    pub fn message(&self) -> Message {
        Message::from_raw(self.rax as isize)
    }

    /// Message arguments (rsi, rdx, r8)
    pub fn args(&self) -> [u64; 3] {
        [self.rsi, self.rdx, self.r8]
    }

    fn clobbered() -> Self {
        Self {
            rax: 0,
            rdi: CLOBBER,
            rsi: CLOBBER,
            rdx: CLOBBER,
            r8: CLOBBER,
            r9: CLOBBER,
        }
    }

    fn set_error(&mut self, err: Error) {
        self.rax = err.as_raw() as u64;
    }

    fn set_payload(&mut self, from: Handle, message: Message, args: [u64; 3]) {
        self.rax = message.as_raw() as u64;
        self.rdi = from.as_raw() as u64;
        [self.rsi, self.rdx, self.r8] = args;
    }
}

/// Answer of a peer to a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub message: Message,
    pub args: [u64; 3],
}

impl Reply {
    pub fn new(message: Message, args: [u64; 3]) -> Self {
        Self { message, args }
    }
}

/// Something the process can talk to through a handle
pub trait Peer {
    /// A message from the process. The reply answers calls, it is dropped for sends.
    fn receive(&mut self, message: Message, args: [u64; 3], ctx: &mut Context<'_>) -> Option<Reply>;

    /// Called before the process looks for a message to receive
    fn poll(&mut self, _ctx: &mut Context<'_>) {}
}

type PeerId = usize;

#[derive(Debug)]
struct Scheduled {
    at: u64,
    seq: u64,
    from: PeerId,
    message: Message,
    args: [u64; 3],
}

#[derive(Debug)]
struct Pending {
    from: PeerId,
    message: Message,
    args: [u64; 3],
}

/// What a peer can do while handling a message
pub struct Context<'a> {
    now: u64,
    peer: PeerId,
    scheduled: &'a mut Vec<Scheduled>,
    seq: &'a mut u64,
    mappings: &'a BTreeMap<usize, Mapping>,
}

impl Context<'_> {
    /// Virtual time in nanoseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Queue a message to the process, from this peer
    pub fn notify(&mut self, message: Message, args: [u64; 3]) {
        self.notify_after(0, message, args);
    }

    /// Queue a message to the process, delivered once `delay_ns` elapsed
    pub fn notify_after(&mut self, delay_ns: u64, message: Message, args: [u64; 3]) {
        *self.seq += 1;
        self.scheduled.push(Scheduled {
            at: self.now + delay_ns,
            seq: *self.seq,
            from: self.peer,
            message,
            args,
        });
    }

    /// Page `number` of the process, if mapped
    pub fn page(&self, number: u64) -> Option<&[u8]> {
        let ptr = self.page_ptr(number)?;
        Some(unsafe { slice::from_raw_parts(ptr, PAGE_SIZE) })
    }

    /// Page `number` of the process, if mapped. The process must have lent it.
    pub fn page_mut(&mut self, number: u64) -> Option<&mut [u8]> {
        let ptr = self.page_ptr(number)?;
        Some(unsafe { slice::from_raw_parts_mut(ptr, PAGE_SIZE) })
    }

    fn page_ptr(&self, number: u64) -> Option<*mut u8> {
        let addr = page_address(number);
        let mapping = find_mapping(self.mappings, addr)?;
        if !mapping.contains(addr + PAGE_SIZE - 1) {
            return None;
        }

        Some(addr as *mut u8)
    }
}

/// Anonymous memory handed to the process
#[derive(Debug)]
pub struct Mapping {
    ptr: *mut u8,
    size: usize,
    pub prot: Protection,

    /// Address the process asked for
    pub requested: usize,
}

impl Mapping {
    fn layout(size: usize) -> Layout {
        Layout::from_size_align(size, PAGE_SIZE).expect("mapping layout")
    }

    pub fn address(&self) -> usize {
        self.ptr as usize
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.address() && addr < self.address() + self.size
    }

    pub fn bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr, self.size) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        unsafe { alloc::dealloc(self.ptr, Self::layout(self.size)) };
    }
}

fn find_mapping(mappings: &BTreeMap<usize, Mapping>, addr: usize) -> Option<&Mapping> {
    let (_, mapping) = mappings.range(..=addr).next_back()?;
    mapping.contains(addr).then_some(mapping)
}

/// Recorded grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub recipient: Handle,
    pub addr: usize,
    pub prot: Protection,
}

#[derive(Default)]
pub struct Kernel {
    now: u64,
    seq: u64,
    peers: Vec<Box<dyn Peer>>,
    handles: BTreeMap<usize, PeerId>,
    inbox: VecDeque<Pending>,
    scheduled: Vec<Scheduled>,
    mappings: BTreeMap<usize, Mapping>,
    grants: Vec<Grant>,
    prefaults: Vec<usize>,
    ports: BTreeMap<u16, u64>,
    debug_output: Vec<u8>,
    entries: Vec<Registers>,
}

impl Kernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `handle` name `peer`
    pub fn attach(&mut self, handle: Handle, peer: impl Peer + 'static) {
        assert!(handle.valid(), "cannot attach a peer to the null handle");
        self.peers.push(Box::new(peer));
        self.handles.insert(handle.as_raw(), self.peers.len() - 1);
    }

    /// Queue a message from the peer named by `from`, as if it had sent it
    pub fn inject(&mut self, from: Handle, message: Message, args: [u64; 3]) {
        let from = *self
            .handles
            .get(&from.as_raw())
            .expect("inject from an unknown handle");
        self.inbox.push_back(Pending {
            from,
            message,
            args,
        });
    }

    /// Input registers of every entry so far
    pub fn entries(&self) -> &[Registers] {
        &self.entries
    }

    pub fn last_entry(&self) -> Option<&Registers> {
        self.entries.last()
    }

    /// Bytes written with [`Builtin::Write`]
    pub fn debug_output(&self) -> &[u8] {
        &self.debug_output
    }

    pub fn has_handle(&self, handle: Handle) -> bool {
        self.handles.contains_key(&handle.as_raw())
    }

    /// Whether both handles name the same peer
    pub fn same_object(&self, a: Handle, b: Handle) -> bool {
        match (self.handles.get(&a.as_raw()), self.handles.get(&b.as_raw())) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Mapping containing `addr`
    pub fn mapping(&self, addr: usize) -> Option<&Mapping> {
        find_mapping(&self.mappings, addr)
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn prefaults(&self) -> &[usize] {
        &self.prefaults
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn port(&self, port: u16) -> Option<u64> {
        self.ports.get(&port).copied()
    }

    /// Number of messages the process could receive without time passing
    pub fn pending(&mut self) -> usize {
        self.poll_peers();
        self.inbox.len()
    }

    fn entry(&mut self, regs: &mut Registers) {
        self.entries.push(*regs);

        let input = *regs;
        let mut out = Registers::clobbered();
        let msg = input.message();

        match Builtin::from_code(msg.code()) {
            Some(Builtin::None) => self.receive(&input, &mut out),
            Some(Builtin::Map) => self.map(&input, &mut out),
            Some(Builtin::PageFault) => self.prefault(&input, &mut out),
            Some(Builtin::HandleModify) => self.handle_modify(&input, &mut out),
            Some(Builtin::Write) => {
                self.debug_output.push(input.rdi as u8);
            }
            Some(Builtin::PortIo) => self.portio(&input, &mut out),
            Some(Builtin::Grant) => self.grant(&input, &mut out),
            Some(Builtin::Pulse) => {
                let args = [input.rsi, 0, 0];
                self.message(&input, msg.with_kind(MessageKind::Send), args, &mut out);
            }
            Some(Builtin::Unmap) => out.set_error(Error::NotSupported),
            None if msg.code() < Builtin::USER => out.set_error(Error::NotSupported),
            None => self.message(&input, msg, input.args(), &mut out),
        }

        *regs = out;
    }

    fn message(&mut self, input: &Registers, msg: Message, args: [u64; 3], out: &mut Registers) {
        let Some(&peer) = self.handles.get(&(input.rdi as usize)) else {
            out.set_error(Error::InvalidHandle);
            return;
        };

        match msg.kind() {
            MessageKind::Send => {
                self.dispatch(peer, msg, args);
            }
            MessageKind::Call => match self.dispatch(peer, msg, args) {
                Some(reply) => {
                    out.set_payload(Handle::from_raw(input.rdi as usize), reply.message, reply.args)
                }
                None => panic!(
                    "call {:?} to {:#x} would block forever: peer never replies",
                    msg, input.rdi
                ),
            },
            MessageKind::Reserved => out.set_error(Error::InvalidArgument),
        }
    }

    fn dispatch(&mut self, peer: PeerId, msg: Message, args: [u64; 3]) -> Option<Reply> {
        let mut ctx = Context {
            now: self.now,
            peer,
            scheduled: &mut self.scheduled,
            seq: &mut self.seq,
            mappings: &self.mappings,
        };
        let reply = self.peers[peer].receive(msg, args, &mut ctx);

        self.flush_due();
        reply
    }

    fn poll_peers(&mut self) {
        for peer in 0..self.peers.len() {
            let mut ctx = Context {
                now: self.now,
                peer,
                scheduled: &mut self.scheduled,
                seq: &mut self.seq,
                mappings: &self.mappings,
            };
            self.peers[peer].poll(&mut ctx);
        }

        self.flush_due();
    }

    /// Move scheduled messages whose time has come to the inbox, in order
    fn flush_due(&mut self) {
        let now = self.now;
        let mut due: Vec<Scheduled> = Vec::new();
        let mut index = 0;
        while index < self.scheduled.len() {
            if self.scheduled[index].at <= now {
                due.push(self.scheduled.swap_remove(index));
            } else {
                index += 1;
            }
        }

        due.sort_by_key(|item| (item.at, item.seq));
        self.inbox.extend(due.into_iter().map(|item| Pending {
            from: item.from,
            message: item.message,
            args: item.args,
        }));
    }

    fn handle_of(&self, peer: PeerId) -> Option<Handle> {
        self.handles
            .iter()
            .find(|&(_, &id)| id == peer)
            .map(|(&handle, _)| Handle::from_raw(handle))
    }

    fn receive(&mut self, input: &Registers, out: &mut Registers) {
        let filter = Handle::from_raw(input.rdi as usize);
        if filter.valid() && !self.has_handle(filter) {
            out.set_error(Error::InvalidHandle);
            return;
        }

        loop {
            self.poll_peers();

            while let Some(index) = self.inbox.iter().position(|pending| {
                !filter.valid() || self.handle_of(pending.from) == Some(filter)
            }) {
                let pending = self.inbox.remove(index).expect("inbox index");
                // Messages from peers the process lost every handle to are dropped
                if let Some(from) = self.handle_of(pending.from) {
                    out.set_payload(from, pending.message, pending.args);
                    return;
                }
            }

            let Some(next) = self.scheduled.iter().map(|item| item.at).min() else {
                panic!(
                    "receive from {:?} would block forever: nothing left to deliver",
                    filter
                );
            };
            self.now = self.now.max(next);
        }
    }

    fn map(&mut self, input: &Registers, out: &mut Registers) {
        let prot = Protection::from_bits_truncate(input.rsi);
        let addr = input.rdx as usize;
        let size = input.r9 as usize;

        let past_ceiling = match addr.checked_add(size) {
            Some(end) => end > USER_MAP_MAX,
            None => true,
        };
        if size == 0 || past_ceiling {
            out.set_error(Error::InvalidArgument);
            return;
        }

        // Only anonymous memory is simulated
        if input.rdi != 0 || !prot.contains(Protection::ANON) {
            out.set_error(Error::NotSupported);
            return;
        }

        let size = page_align_up(size);
        let ptr = unsafe { alloc::alloc_zeroed(Mapping::layout(size)) };
        if ptr.is_null() {
            out.set_error(Error::OutOfMemory);
            return;
        }

        self.mappings.insert(
            ptr as usize,
            Mapping {
                ptr,
                size,
                prot,
                requested: addr,
            },
        );
        out.rax = ptr as u64;
    }

    fn prefault(&mut self, input: &Registers, out: &mut Registers) {
        let addr = input.rsi as usize;
        let prot = Protection::from_bits_truncate(input.rdx) & Protection::RWX;

        match self.mapping(addr) {
            Some(mapping) if mapping.prot.contains(prot) => {
                self.prefaults.push(addr);
                out.rax = 0;
            }
            _ => out.set_error(Error::InvalidArgument),
        }
    }

    fn grant(&mut self, input: &Registers, out: &mut Registers) {
        let recipient = Handle::from_raw(input.rdi as usize);
        let addr = input.rsi as usize;
        let prot = Protection::from_bits_truncate(input.rdx);

        if !self.has_handle(recipient) {
            out.set_error(Error::InvalidHandle);
            return;
        }
        if self.mapping(addr).is_none() {
            out.set_error(Error::InvalidArgument);
            return;
        }

        self.grants.push(Grant {
            recipient,
            addr,
            prot,
        });
        out.rax = 0;
    }

    fn handle_modify(&mut self, input: &Registers, out: &mut Registers) {
        let handle = Handle::from_raw(input.rdi as usize);
        let rename_to = Handle::from_raw(input.rsi as usize);
        let copy_to = Handle::from_raw(input.rdx as usize);

        let Some(&peer) = self.handles.get(&handle.as_raw()) else {
            out.set_error(Error::InvalidHandle);
            return;
        };

        match HandleOp::classify(handle, rename_to, copy_to) {
            HandleOp::NoOp => {}
            HandleOp::Delete => {
                self.handles.remove(&handle.as_raw());
            }
            HandleOp::Rename => {
                if self.has_handle(rename_to) {
                    out.set_error(Error::InvalidArgument);
                    return;
                }
                self.handles.remove(&handle.as_raw());
                self.handles.insert(rename_to.as_raw(), peer);
            }
            HandleOp::Copy => {
                if self.has_handle(copy_to) {
                    out.set_error(Error::InvalidArgument);
                    return;
                }
                self.handles.insert(copy_to.as_raw(), peer);
            }
        }

        out.rax = 0;
    }

    fn portio(&mut self, input: &Registers, out: &mut Registers) {
        let port = input.rdi as u16;
        let flags = PortIoFlags::from_bits_truncate(input.rsi);

        let mask = if flags.contains(PortIoFlags::BYTE) {
            0xff
        } else if flags.contains(PortIoFlags::WORD) {
            0xffff
        } else if flags.contains(PortIoFlags::DWORD) {
            0xffff_ffff
        } else {
            out.set_error(Error::InvalidArgument);
            return;
        };

        if flags.contains(PortIoFlags::WRITE) {
            self.ports.insert(port, input.rdx & mask);
            out.rax = 0;
        } else {
            out.rax = self.ports.get(&port).copied().unwrap_or(0) & mask;
        }
    }
}

thread_local! {
    static KERNEL: RefCell<Option<Kernel>> = const { RefCell::new(None) };
}

/// Replace the kernel of the current thread
pub fn install(kernel: Kernel) {
    KERNEL.with(|cell| *cell.borrow_mut() = Some(kernel));
}

/// Inspect or drive the kernel of the current thread
pub fn with<R>(f: impl FnOnce(&mut Kernel) -> R) -> R {
    KERNEL.with(|cell| {
        let mut kernel = cell.borrow_mut();
        f(kernel.as_mut().expect("no mock kernel installed on this thread"))
    })
}

pub(crate) fn enter(regs: &mut Registers) {
    with(|kernel| kernel.entry(regs));
}
