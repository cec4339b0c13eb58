//! `ping`: send a signal to a process by pid.
//!
//! Usage: `ping <pid> <signal>`. Signal numbers wrap modulo 32; signal 0
//! only checks that the process exists.

use std::io;

pub fn run(argv: &[String]) -> i32 {
    if argv.len() != 3 {
        println!("ping: Invalid Syntax!");
        return 1;
    }

    let pid = match argv[1].parse::<i32>() {
        Ok(pid) if pid > 0 => pid,
        _ => {
            println!("No such process found");
            return 1;
        }
    };
    let Ok(signal) = argv[2].parse::<i64>() else {
        println!("ping: Invalid Syntax!");
        return 1;
    };

    let actual = (signal % 32) as i32;
    let rc = unsafe { libc::kill(pid, actual) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            println!("No such process found");
        } else {
            eprintln!("kill: {err}");
        }
        return 1;
    }

    println!("Sent signal {} to process with pid {}", signal, pid);
    0
}
