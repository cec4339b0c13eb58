//! Signal handling for the shell process and its children.
//!
//! While the shell owns the terminal it must not be stopped by the signals
//! the terminal driver generates for job control: SIGTTOU/SIGTTIN would
//! otherwise stop the shell the moment it calls `tcsetpgrp` from what the
//! kernel considers a background group, and SIGTSTP would let Ctrl-Z suspend
//! the shell itself. SIGINT only records a pending-interrupt flag; the line
//! editor owns read interruption, and the terminal driver delivers Ctrl-C to
//! whichever process group holds the terminal.
//!
//! A forked child gets the opposite treatment: all four dispositions return
//! to their defaults before any builtin or exec runs, so a foregrounded job
//! can be interrupted and stopped normally.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{signal, SigHandler, Signal};

/// Set when SIGINT reaches the shell outside a line read.
static INTERRUPT_PENDING: AtomicBool = AtomicBool::new(false);

/// Install the shell's dispositions. Called once at startup, before the
/// shell takes ownership of the terminal.
pub fn install_shell_handlers() {
    unsafe {
        let _ = signal_hook::low_level::register(signal_hook::consts::SIGINT, || {
            INTERRUPT_PENDING.store(true, Ordering::SeqCst);
        });
        let _ = signal(Signal::SIGTSTP, SigHandler::SigIgn);
        let _ = signal(Signal::SIGTTOU, SigHandler::SigIgn);
        let _ = signal(Signal::SIGTTIN, SigHandler::SigIgn);
    }
}

/// Check and clear the pending-interrupt flag.
pub fn take_interrupt() -> bool {
    INTERRUPT_PENDING.swap(false, Ordering::SeqCst)
}

/// Restore default dispositions in a freshly forked child. Must run before
/// the process-group join and exec so the terminal can signal the whole
/// pipeline group atomically.
pub fn reset_for_child() {
    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTSTP, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTTOU, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTTIN, SigHandler::SigDfl);
    }
}
