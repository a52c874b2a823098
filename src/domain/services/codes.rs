use rand::Rng;

/// Unambiguous alphabet for customer-facing codes (no I/L/O/0/1).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

fn random_block(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn booking_code() -> String {
    format!("MB-{}", random_block(8))
}

pub fn voucher_code() -> String {
    format!("GV-{}", random_block(10))
}

/// Ticket codes are derived deterministically from the booking code and the
/// ticket's ordinal within the booking (1-based).
pub fn ticket_code(booking_code: &str, ordinal: u32) -> String {
    format!("{}-T{}", booking_code, ordinal)
}
