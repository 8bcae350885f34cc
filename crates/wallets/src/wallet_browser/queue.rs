use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

/// Requests carry the id their response is matched by.
pub(crate) trait Identified {
    fn id(&self) -> Uuid;
}

/// FIFO of requests waiting for the bridge page, plus responses waiting to be collected.
#[derive(Debug)]
pub(crate) struct RequestQueue<Req, Res> {
    requests: VecDeque<Req>,
    responses: HashMap<Uuid, Res>,
}

impl<Req: Identified, Res> Default for RequestQueue<Req, Res> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req: Identified, Res> RequestQueue<Req, Res> {
    pub fn new() -> Self {
        Self { requests: VecDeque::new(), responses: HashMap::new() }
    }

    pub fn add_request(&mut self, request: Req) {
        self.requests.push_back(request);
    }

    pub fn has_request(&self, id: &Uuid) -> bool {
        self.requests.iter().any(|r| r.id() == *id)
    }

    /// The oldest pending request, left in the queue until answered.
    pub fn read_request(&self) -> Option<&Req> {
        self.requests.front()
    }

    pub fn remove_request(&mut self, id: &Uuid) {
        self.requests.retain(|r| r.id() != *id);
    }

    pub fn add_response(&mut self, id: Uuid, response: Res) {
        self.responses.insert(id, response);
    }

    /// Takes the response for `id`, if it arrived.
    pub fn get_response(&mut self, id: &Uuid) -> Option<Res> {
        self.responses.remove(id)
    }
}
