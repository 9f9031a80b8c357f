//! Same entry points as the x86_64 backend, routed into the host kernel simulator.
//!
//! Inputs the real entry leaves undefined are filled with [`POISON`], outputs the real entry
//! does not declare are dropped, so the simulator sees exactly what the kernel would.

use crate::mock::{self, Registers};

/// Value of argument registers the caller did not set
pub const POISON: u64 = 0xdead_beef_dead_beef;

fn enter(msg: isize, rdi: u64, rsi: u64, rdx: u64, r8: u64, r9: u64) -> Registers {
    let mut regs = Registers {
        rax: msg as u64,
        rdi,
        rsi,
        rdx,
        r8,
        r9,
    };
    mock::enter(&mut regs);
    regs
}

pub unsafe fn syscall1(msg: isize, dest: u64) -> isize {
    enter(msg, dest, POISON, POISON, POISON, POISON).rax as isize
}

pub unsafe fn syscall2(msg: isize, arg1: u64, arg2: u64) -> isize {
    enter(msg, arg1, arg2, POISON, POISON, POISON).rax as isize
}

pub unsafe fn syscall3(msg: isize, arg1: u64, arg2: u64, arg3: u64) -> isize {
    enter(msg, arg1, arg2, arg3, POISON, POISON).rax as isize
}

pub unsafe fn syscall4(msg: isize, dest: u64, arg1: u64, arg2: u64, arg3: u64) -> isize {
    enter(msg, dest, arg1, arg2, arg3, POISON).rax as isize
}

pub unsafe fn syscall5(msg: isize, dest: u64, arg1: u64, arg2: u64, arg3: u64, arg4: u64) -> isize {
    enter(msg, dest, arg1, arg2, arg3, arg4).rax as isize
}

pub unsafe fn ipc1(msg: isize, dest_src: &mut u64, arg1: &mut u64) -> isize {
    let regs = enter(msg, *dest_src, *arg1, POISON, POISON, POISON);
    *dest_src = regs.rdi;
    *arg1 = regs.rsi;
    regs.rax as isize
}

pub unsafe fn ipc2(msg: isize, dest_src: &mut u64, arg1: &mut u64, arg2: &mut u64) -> isize {
    let regs = enter(msg, *dest_src, *arg1, *arg2, POISON, POISON);
    *dest_src = regs.rdi;
    *arg1 = regs.rsi;
    *arg2 = regs.rdx;
    regs.rax as isize
}

pub unsafe fn ipc3(
    msg: isize,
    dest_src: &mut u64,
    arg1: &mut u64,
    arg2: &mut u64,
    arg3: &mut u64,
) -> isize {
    let regs = enter(msg, *dest_src, *arg1, *arg2, *arg3, POISON);
    *dest_src = regs.rdi;
    *arg1 = regs.rsi;
    *arg2 = regs.rdx;
    *arg3 = regs.r8;
    regs.rax as isize
}

pub unsafe fn recv0(src: &mut u64) -> isize {
    let regs = enter(0, *src, POISON, POISON, POISON, POISON);
    *src = regs.rdi;
    regs.rax as isize
}

pub unsafe fn recv1(src: &mut u64, arg1: &mut u64) -> isize {
    let regs = enter(0, *src, POISON, POISON, POISON, POISON);
    *src = regs.rdi;
    *arg1 = regs.rsi;
    regs.rax as isize
}

pub unsafe fn recv2(src: &mut u64, arg1: &mut u64, arg2: &mut u64) -> isize {
    let regs = enter(0, *src, POISON, POISON, POISON, POISON);
    *src = regs.rdi;
    *arg1 = regs.rsi;
    *arg2 = regs.rdx;
    regs.rax as isize
}

pub unsafe fn recv3(src: &mut u64, arg1: &mut u64, arg2: &mut u64, arg3: &mut u64) -> isize {
    let regs = enter(0, *src, POISON, POISON, POISON, POISON);
    *src = regs.rdi;
    *arg1 = regs.rsi;
    *arg2 = regs.rdx;
    *arg3 = regs.r8;
    regs.rax as isize
}
