#![cfg(target_arch = "x86_64")]

use core::arch::asm;

#[inline(always)]
pub unsafe fn syscall1(msg: isize, dest: u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") msg => ret,
            inlateout("rdi") dest => _,
            lateout("rsi") _,
            lateout("rdx") _,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn syscall2(msg: isize, arg1: u64, arg2: u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") msg => ret,
            inlateout("rdi") arg1 => _,
            inlateout("rsi") arg2 => _,
            lateout("rdx") _,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn syscall3(msg: isize, arg1: u64, arg2: u64, arg3: u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") msg => ret,
            inlateout("rdi") arg1 => _,
            inlateout("rsi") arg2 => _,
            inlateout("rdx") arg3 => _,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn syscall4(msg: isize, dest: u64, arg1: u64, arg2: u64, arg3: u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") msg => ret,
            inlateout("rdi") dest => _,
            inlateout("rsi") arg1 => _,
            inlateout("rdx") arg2 => _,
            inlateout("r8") arg3 => _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn syscall5(msg: isize, dest: u64, arg1: u64, arg2: u64, arg3: u64, arg4: u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") msg => ret,
            inlateout("rdi") dest => _,
            inlateout("rsi") arg1 => _,
            inlateout("rdx") arg2 => _,
            inlateout("r8") arg3 => _,
            inlateout("r9") arg4 => _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn ipc1(msg: isize, dest_src: &mut u64, arg1: &mut u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") msg => ret,
            inout("rdi") *dest_src,
            inout("rsi") *arg1,
            lateout("rdx") _,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn ipc2(msg: isize, dest_src: &mut u64, arg1: &mut u64, arg2: &mut u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") msg => ret,
            inout("rdi") *dest_src,
            inout("rsi") *arg1,
            inout("rdx") *arg2,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

// Send 3, receive 3, r9 and r10 ignored
#[inline(always)]
pub unsafe fn ipc3(
    msg: isize,
    dest_src: &mut u64,
    arg1: &mut u64,
    arg2: &mut u64,
    arg3: &mut u64,
) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") msg => ret,
            inout("rdi") *dest_src,
            inout("rsi") *arg1,
            inout("rdx") *arg2,
            inout("r8") *arg3,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn recv0(src: &mut u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") 0isize => ret,
            inout("rdi") *src,
            lateout("rsi") _,
            lateout("rdx") _,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn recv1(src: &mut u64, arg1: &mut u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") 0isize => ret,
            inout("rdi") *src,
            lateout("rsi") *arg1,
            lateout("rdx") _,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn recv2(src: &mut u64, arg1: &mut u64, arg2: &mut u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") 0isize => ret,
            inout("rdi") *src,
            lateout("rsi") *arg1,
            lateout("rdx") *arg2,
            lateout("r8") _,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}

#[inline(always)]
pub unsafe fn recv3(src: &mut u64, arg1: &mut u64, arg2: &mut u64, arg3: &mut u64) -> isize {
    let ret: isize;
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") 0isize => ret,
            inout("rdi") *src,
            lateout("rsi") *arg1,
            lateout("rdx") *arg2,
            lateout("r8") *arg3,
            lateout("r9") _,
            lateout("r10") _,
            lateout("r11") _,
            lateout("rcx") _,
            options(nostack),
        );
    }
    ret
}
