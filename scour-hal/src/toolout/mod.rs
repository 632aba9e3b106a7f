//! Parsers for the textual output of the external block-device tools.
//!
//! The cleanup engine treats human-oriented tool output as its contract;
//! these helpers centralise the tokenisation so the operations stay thin.

pub mod dmsetup;
pub mod lsblk;
pub mod lvm;
pub mod mdadm;
