/// ----- INPUTS MODULE -----
/// Polls the terminal for key presses on its own thread and reports a
/// quit request over a channel.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::error;

pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub fn init(poll_period: Duration) -> std::io::Result<Receiver<()>> {
    let (quit_tx, quit_rx) = unbounded();
    thread::Builder::new()
        .name("inputs".to_string())
        .spawn(move || poll_keys(quit_tx, poll_period))?;
    Ok(quit_rx)
}

fn poll_keys(quit_tx: Sender<()>, poll_period: Duration) {
    loop {
        let ready = match event::poll(poll_period) {
            Ok(ready) => ready,
            Err(e) => {
                error!(error = %e, "terminal input unavailable");
                break;
            }
        };
        if !ready {
            continue;
        }
        match event::read() {
            Ok(Event::Key(key)) if is_quit_key(&key) => break,
            Ok(_) => (),
            Err(e) => {
                error!(error = %e, "failed to read terminal event");
                break;
            }
        }
    }
    // receiver may already be gone if the scheduler stopped first
    let _ = quit_tx.send(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_keys() {
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn other_keys_are_ignored() {
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!is_quit_key(&KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release
        )));
    }
}
