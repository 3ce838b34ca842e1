use std::ops::ControlFlow;

use bytes::Bytes;
use rustc_hash::FxHashSet;

use super::FeedActor;
use crate::actor::messages::{FeedMsg, Removal};
use crate::client::ClientHandle;
use crate::protocol::{MessageType, encode_message};

impl FeedActor {
    /// Apply one inbox message. `Break` ends the loop.
    pub(super) fn handle(&mut self, msg: FeedMsg) -> ControlFlow<()> {
        match msg {
            FeedMsg::AddClient { client, reply } => {
                self.add_client(client);
                let _ = reply.send(Ok(()));
            }

            FeedMsg::RemoveClient { client, reply } => {
                let removal = self.remove_client(&client);
                let _ = reply.send(removal);
                if removal == Removal::Empty {
                    return ControlFlow::Break(());
                }
            }

            FeedMsg::Broadcast(payload) => self.buffer_message(&payload),

            FeedMsg::InsertPost { post, payload } => match payload {
                Some(payload) => {
                    self.cache.apply_new_post(post);
                    self.buffer_message(&payload);
                }
                None => {
                    crate::debug!("feed"; "thread {} reattached post {}", self.thread, post.id);
                    self.cache.reattach_post(post);
                }
            },

            FeedMsg::SetOpenBody { id, body, payload } => {
                if !self.cache.apply_body_update(id, body) {
                    self.missing_post(id);
                }
                self.buffer_message(&payload);
            }

            FeedMsg::InsertImage { id, image, payload } => {
                if !self.cache.apply_image_insert(id, image) {
                    self.missing_post(id);
                }
                self.buffer_message(&payload);
            }

            FeedMsg::PostMutation { id, kind, payload } => {
                if !self.cache.apply_post_mutation(id, kind) {
                    self.missing_post(id);
                }
                self.buffer_message(&payload);
            }
        }
        ControlFlow::Continue(())
    }

    fn add_client(&mut self, client: ClientHandle) {
        let caps = client.capabilities();
        let frame = if caps.new_protocol {
            self.cache.encode_full_thread(caps.last_n)
        } else {
            self.cache.encode_legacy_summary()
        };
        match frame {
            Ok(frame) => client.send(frame),
            Err(err) => {
                crate::log!("error"; "thread {}: failed to encode sync message: {}", self.thread, err)
            }
        }

        self.clients.push(client);
        crate::debug_do! {
            let ips: Vec<_> = self.clients.iter().map(|c| c.ip()).collect();
            crate::debug!("feed"; "thread {} has {} clients: {:?}", self.thread, ips.len(), ips);
        }
        self.send_ip_count();
    }

    fn remove_client(&mut self, client: &ClientHandle) -> Removal {
        if let Some(pos) = self.clients.iter().position(|c| c == client) {
            self.clients.remove(pos);
        }
        if self.clients.is_empty() {
            return Removal::Empty;
        }
        crate::debug!("feed"; "thread {} has {} clients", self.thread, self.clients.len());
        self.send_ip_count();
        Removal::Remaining(self.clients.len())
    }

    fn missing_post(&self, id: u64) {
        crate::debug!("feed"; "thread {}: post {} not cached, forwarding only", self.thread, id);
    }

    /// Queue a payload for the next tick.
    fn buffer_message(&mut self, payload: &[u8]) {
        self.ticker.resume();
        self.buffer.write(payload);
    }

    /// Queue the unique IP count, if it changed since the last one queued.
    fn send_ip_count(&mut self) {
        let ips: FxHashSet<_> = self.clients.iter().map(|c| c.ip()).collect();
        let count = ips.len();
        if self.last_ip_count == Some(count) {
            return;
        }
        self.last_ip_count = Some(count);

        match encode_message(MessageType::SyncCount, &count) {
            Ok(msg) => self.buffer_message(&msg),
            Err(err) => crate::log!("error"; "failed to encode ip count: {}", err),
        }
    }

    /// Send buffered messages to every client, or pause when idle.
    pub(super) fn flush(&mut self) {
        let Some(frame) = self.buffer.flush() else {
            self.ticker.pause();
            return;
        };
        crate::debug!("feed"; "thread {}: {} bytes to {} clients", self.thread, frame.len(), self.clients.len());
        self.send_to_all(frame);
    }

    fn send_to_all(&self, frame: Bytes) {
        for client in &self.clients {
            client.send(frame.clone());
        }
    }
}
