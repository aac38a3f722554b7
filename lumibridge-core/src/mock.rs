use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::serial::SerialLink;

/// In-memory serial double: records written bytes and hands out scripted
/// reply lines, one per read, in order.
#[derive(Clone, Default)]
pub struct ScriptedLink {
    pub written: Arc<Mutex<Vec<u8>>>,
    replies: Arc<Mutex<VecDeque<String>>>,
    fail_writes: bool,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, line: &str) -> Self {
        self.replies.lock().unwrap().push_back(line.to_string());
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn written_bytes(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }
}

impl SerialLink for ScriptedLink {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port closed").into());
        }

        self.written.lock().unwrap().push(byte);
        Ok(())
    }

    fn try_read_line(&mut self) -> Result<Option<String>> {
        Ok(self.replies.lock().unwrap().pop_front())
    }
}
