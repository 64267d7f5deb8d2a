use crate::models::poll_models::{Poll, PollOption};

/// Option with the most votes; the earliest option wins a tie.
/// `None` while nobody has voted.
pub fn winning_option(poll: &Poll) -> Option<&PollOption> {
    let mut winner: Option<&PollOption> = None;
    for option in &poll.options {
        match winner {
            Some(best) if option.votes <= best.votes => {}
            _ if option.votes == 0 => {}
            _ => winner = Some(option),
        }
    }
    winner
}

/// Share of `total_votes`, in percent, rounded to one decimal place.
pub fn percentage(votes: u32, total_votes: u32) -> f64 {
    if total_votes == 0 {
        return 0.0;
    }
    let raw = f64::from(votes) / f64::from(total_votes) * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Whether a viewer gets tallies: once results are revealed, once they have
/// voted themselves, or once the poll is closed.
pub fn results_visible(poll: &Poll, viewer_has_voted: bool) -> bool {
    poll.show_results || viewer_has_voted || !poll.is_active
}
