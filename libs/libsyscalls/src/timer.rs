use syscalls::timer::{Time, TimerMessage};

use super::{Handle, Message, SyscallResult, ipc};

/// One-shot: [`TimerMessage::Fired`] arrives from `timer` after about `timeout_ns`
pub fn register(timer: Handle, timeout_ns: u64) -> SyscallResult<()> {
    ipc::send1(Message::send(TimerMessage::Register as u8), timer, timeout_ns)
}

pub fn is_fired(msg: Message) -> bool {
    msg.code() == TimerMessage::Fired as u8
}

pub fn get_time(timer: Handle) -> SyscallResult<Time> {
    let (mut millis, mut ticks) = (0, 0);
    ipc::call2(Message::call(TimerMessage::GetTime as u8), timer, &mut millis, &mut ticks)?;

    Ok(Time { millis, ticks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Echo, Kernel, MockTimer, TICK_NS};

    const TIMER: Handle = Handle::from_raw(0x60);

    fn boot() -> MockTimer {
        let timer = MockTimer::new();
        let mut kernel = Kernel::new();
        kernel.attach(TIMER, timer.clone());
        mock::install(kernel);
        timer
    }

    #[test]
    fn registered_timer_fires() {
        let timer = boot();

        register(TIMER, 1_000_000).unwrap();
        assert_eq!(timer.registrations(), [1_000_000]);

        let mut src = Handle::NONE;
        let msg = ipc::recv0(&mut src).unwrap();

        assert_eq!(src, TIMER);
        assert!(is_fired(msg));
        assert_eq!(mock::with(|kernel| kernel.now()), 1_000_000);
    }

    #[test]
    fn shortest_timeout_fires_first() {
        let other = Handle::from_raw(0x61);
        let mut kernel = Kernel::new();
        kernel.attach(TIMER, MockTimer::new());
        kernel.attach(other, MockTimer::new());
        mock::install(kernel);

        register(TIMER, 5_000_000).unwrap();
        register(other, 2_000_000).unwrap();

        let mut src = Handle::NONE;
        assert!(is_fired(ipc::recv0(&mut src).unwrap()));
        assert_eq!(src, other);

        let mut src = Handle::NONE;
        assert!(is_fired(ipc::recv0(&mut src).unwrap()));
        assert_eq!(src, TIMER);
    }

    #[test]
    fn messages_already_queued_come_before_timers() {
        let peer = Handle::from_raw(0x70);
        let mut kernel = Kernel::new();
        kernel.attach(TIMER, MockTimer::new());
        kernel.attach(peer, Echo::new());
        mock::install(kernel);

        register(TIMER, 1_000).unwrap();
        mock::with(|kernel| kernel.inject(peer, Message::send(30), [0; 3]));

        let mut src = Handle::NONE;
        assert_eq!(ipc::recv0(&mut src), Ok(Message::send(30)));
        assert_eq!(src, peer);
        assert_eq!(mock::with(|kernel| kernel.now()), 0);
    }

    #[test]
    fn time_follows_clock() {
        boot();

        assert_eq!(get_time(TIMER), Ok(Time { millis: 0, ticks: 0 }));

        register(TIMER, 25_000_000).unwrap();
        let mut src = TIMER;
        ipc::recv0(&mut src).unwrap();

        assert_eq!(
            get_time(TIMER),
            Ok(Time {
                millis: 25,
                ticks: 25_000_000 / TICK_NS,
            })
        );
    }
}
