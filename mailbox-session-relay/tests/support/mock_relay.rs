use async_trait::async_trait;
use mailbox_session_core::{ActorId, Member, SessionId};
use mailbox_session_relay::{
    MailboxTransport, MatchCallback, SearchHandle, SessionAnnouncement, SessionInfo,
    TransportError,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory relay with scriptable failures
///
/// Stands in for the blockchain mailbox: records everything the
/// coordinator sends, pops scripted errors, and lets tests drive
/// searches by announcing lobbies.
pub struct MockRelay {
    state: Mutex<RelayState>,
    balance: AtomicU64,
    pub send_calls: AtomicU32,
    pub balance_calls: AtomicU32,
    pub prepare_calls: AtomicU32,
    active_searches: Arc<AtomicU32>,
}

struct RelayState {
    send_failures: VecDeque<TransportError>,
    sent: Vec<(ActorId, String)>,
    requested_limits: Vec<u8>,
    closed: Vec<SessionId>,
    left: Vec<SessionId>,
    join_code: Option<String>,
    fail_session_ops: bool,
    fail_prepare: bool,
    searches: Vec<SearchSink>,
}

struct SearchSink {
    active: Arc<AtomicBool>,
    prefix: Option<String>,
    callback: MatchCallback,
}

impl MockRelay {
    pub fn new() -> Arc<Self> {
        Arc::new(MockRelay {
            state: Mutex::new(RelayState {
                send_failures: VecDeque::new(),
                sent: Vec::new(),
                requested_limits: Vec::new(),
                closed: Vec::new(),
                left: Vec::new(),
                join_code: Some("FROG-42".to_string()),
                fail_session_ops: false,
                fail_prepare: false,
                searches: Vec::new(),
            }),
            balance: AtomicU64::new(5),
            send_calls: AtomicU32::new(0),
            balance_calls: AtomicU32::new(0),
            prepare_calls: AtomicU32::new(0),
            active_searches: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Queue errors returned by the next send_message calls
    pub fn script_send_failures(&self, failures: Vec<TransportError>) {
        self.state.lock().unwrap().send_failures.extend(failures);
    }

    pub fn set_balance(&self, units: u64) {
        self.balance.store(units, Ordering::SeqCst);
    }

    pub fn fail_session_ops(&self) {
        self.state.lock().unwrap().fail_session_ops = true;
    }

    pub fn fail_prepare(&self) {
        self.state.lock().unwrap().fail_prepare = true;
    }

    /// Payloads delivered so far, in send order
    pub fn sent(&self) -> Vec<(ActorId, String)> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Member limits the coordinator asked for at create time
    pub fn requested_limits(&self) -> Vec<u8> {
        self.state.lock().unwrap().requested_limits.clone()
    }

    pub fn closed_sessions(&self) -> Vec<SessionId> {
        self.state.lock().unwrap().closed.clone()
    }

    pub fn left_sessions(&self) -> Vec<SessionId> {
        self.state.lock().unwrap().left.clone()
    }

    pub fn searches_active(&self) -> u32 {
        self.active_searches.load(Ordering::SeqCst)
    }

    /// Push an announcement through every live search subscription
    pub fn announce(&self, announcement: SessionAnnouncement) {
        let state = self.state.lock().unwrap();
        for sink in &state.searches {
            if !sink.active.load(Ordering::SeqCst) {
                continue;
            }
            if let Some(prefix) = &sink.prefix {
                if !announcement.name.starts_with(prefix.as_str()) {
                    continue;
                }
            }
            (sink.callback)(announcement.clone());
        }
    }

    fn local_member(display_name: &str) -> Result<Member, TransportError> {
        Member::new(ActorId::new("relay1local"), display_name)
            .map_err(|err| TransportError::Rejected(err.to_string()))
    }
}

#[async_trait]
impl MailboxTransport for MockRelay {
    async fn create_session(
        &self,
        name: &str,
        display_name: &str,
        member_limit: u8,
    ) -> Result<SessionInfo, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requested_limits.push(member_limit);

        Ok(SessionInfo {
            session_id: SessionId::new("lobby-mbx-1"),
            mailbox: ActorId::new("lobby-mbx-1"),
            local_actor: ActorId::new("relay1local"),
            name: name.to_string(),
            join_code: state.join_code.clone(),
            member_limit,
            members: vec![Self::local_member(display_name)?],
        })
    }

    async fn join_session(
        &self,
        anchor: &str,
        display_name: &str,
    ) -> Result<SessionInfo, TransportError> {
        let host = Member::new(ActorId::new("relay1host"), "Host")
            .map_err(|err| TransportError::Rejected(err.to_string()))?;

        Ok(SessionInfo {
            session_id: SessionId::new(anchor),
            mailbox: ActorId::new(anchor),
            local_actor: ActorId::new("relay1local"),
            name: "Arena".to_string(),
            join_code: None,
            member_limit: 4,
            members: vec![host, Self::local_member(display_name)?],
        })
    }

    async fn close_session(&self, session: &SessionId) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_session_ops {
            return Err(TransportError::Unreachable("relay offline".to_string()));
        }
        state.closed.push(session.clone());
        Ok(())
    }

    async fn leave_session(&self, session: &SessionId) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_session_ops {
            return Err(TransportError::Unreachable("relay offline".to_string()));
        }
        state.left.push(session.clone());
        Ok(())
    }

    async fn send_message(&self, target: &ActorId, payload: &str) -> Result<(), TransportError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().unwrap();
        if let Some(failure) = state.send_failures.pop_front() {
            return Err(failure);
        }

        state.sent.push((target.clone(), payload.to_string()));
        Ok(())
    }

    async fn get_balance(&self) -> Result<u64, TransportError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance.load(Ordering::SeqCst))
    }

    async fn prepare_funding(&self) -> Result<(), TransportError> {
        self.prepare_calls.fetch_add(1, Ordering::SeqCst);

        if self.state.lock().unwrap().fail_prepare {
            return Err(TransportError::NoFundingUnits);
        }
        Ok(())
    }

    fn search_sessions(
        &self,
        prefix: Option<&str>,
        on_match: MatchCallback,
    ) -> Result<SearchHandle, TransportError> {
        let active = Arc::new(AtomicBool::new(true));
        self.active_searches.fetch_add(1, Ordering::SeqCst);

        self.state.lock().unwrap().searches.push(SearchSink {
            active: active.clone(),
            prefix: prefix.map(str::to_string),
            callback: on_match,
        });

        let counter = self.active_searches.clone();
        Ok(SearchHandle::new(move || {
            if active.swap(false, Ordering::SeqCst) {
                counter.fetch_sub(1, Ordering::SeqCst);
            }
        }))
    }
}
