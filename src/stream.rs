//! Lazy documents over a Subscribe stream
//!
//! [`DocumentStream`] pulls one message at a time from any iterator of
//! [`SubscribeResponse`] and hands out its documents before pulling the next.
//! Dropping the stream is all it takes to stop.

use std::collections::VecDeque;

use crate::assembler::{Document, RecordAssembler};
use crate::error::Result;
use crate::messages::SubscribeResponse;

/// Iterator of documents produced from a sequence of subscribe messages
///
/// A message that fails to parse yields its error once; the stream then
/// carries on with the next message.
pub struct DocumentStream<'a, I> {
    assembler: &'a RecordAssembler,
    messages: I,
    pending: VecDeque<Document>,
}

impl<'a, I> DocumentStream<'a, I>
where
    I: Iterator<Item = SubscribeResponse>,
{
    pub fn new(assembler: &'a RecordAssembler, messages: I) -> Self {
        Self {
            assembler,
            messages,
            pending: VecDeque::new(),
        }
    }
}

impl<I> Iterator for DocumentStream<'_, I>
where
    I: Iterator<Item = SubscribeResponse>,
{
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(document) = self.pending.pop_front() {
                return Some(Ok(document));
            }
            let message = self.messages.next()?;
            match self.assembler.parse_subscribe(&message) {
                Ok(documents) => self.pending.extend(documents),
                Err(e) => {
                    log::warn!("Dropping subscribe message: {}", e);
                    return Some(Err(e));
                }
            }
        }
    }
}

impl RecordAssembler {
    /// Documents for every message of a subscription, produced lazily
    pub fn documents<I>(&self, messages: I) -> DocumentStream<'_, I::IntoIter>
    where
        I: IntoIterator<Item = SubscribeResponse>,
    {
        DocumentStream::new(self, messages.into_iter())
    }
}
