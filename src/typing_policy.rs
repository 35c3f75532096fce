use crate::comparator::is_commit_ready;
use crate::engine::TypingSession;
use crate::session::Phase;

/// Apply a controlled-input change: the caller hands over the whole buffer on
/// every edit.
///
/// The first non-empty buffer starts an idle session; for a code line the
/// seeded indentation is kept in front of it unless the buffer already carries
/// it. A buffer ending in the active token's separator commits the text before
/// it; a lone separator is dropped. Returns whether the session changed.
pub fn apply_input_change(session: &mut TypingSession, buffer: &str) -> bool {
    let Some(separator) = session.current_token().map(|t| t.kind().separator()) else {
        return false;
    };
    let committing = buffer.strip_suffix(separator).is_some();
    let mut body = buffer.strip_suffix(separator).unwrap_or(buffer);

    let seeded;
    if session.phase() == Phase::Idle {
        if body.is_empty() {
            return false;
        }
        session.start();
        let indentation = session.current_input();
        if !body.starts_with(indentation) {
            seeded = format!("{indentation}{body}");
            body = &seeded;
        }
    }
    if session.phase() != Phase::Running {
        return false;
    }

    let ready = committing
        && session
            .current_token()
            .is_some_and(|token| is_commit_ready(token, body, separator));
    session.update_input(body);
    if ready {
        session.commit_current_token()
    } else {
        true
    }
}
