// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use quorum_core::error::Result;
use quorum_core::output::{decode_otp, generate_otp};

use crate::output::Output;

pub fn cmd_generate_otp(out: &Output) -> Result<()> {
    let otp = generate_otp();
    out.success("Generated one-time pad");
    out.info("Keep it private until the ceremony completes.");
    out.emit(&otp);
    Ok(())
}

pub fn cmd_decode(out: &Output, otp: &str, encoded: &str) -> Result<()> {
    let id = decode_otp(encoded, otp)?;
    out.success("Decoded root credential");
    out.emit(&id);
    Ok(())
}
