//! In-memory backend recording every call, used by service tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use futures::future::{BoxFuture, ready};

use crate::dao::{
    backend::{BulkCollection, HackathonApi, MailKind},
    error::{ApiError, ApiResult},
    models::{
        GenerateResponse, HackathonRecord, HackathonState, JuryMember, Link, Links,
        NewJuryMember, NewParticipant, NewSubject, Participant, Period, Status, Subject, Team,
        TeamMember,
    },
};

/// Mutable backend contents, inspectable from tests.
#[derive(Debug)]
pub struct MemoryBackend {
    pub state: HackathonState,
    pub period: Option<Period>,
    pub participants: Vec<Participant>,
    pub jury_members: Vec<JuryMember>,
    pub teams: Vec<Team>,
    pub hackathons: Vec<HackathonRecord>,
    pub subjects: Vec<Subject>,
    /// Subject returned by `/hackathons/{id}/juryMember` once a hackathon exists.
    pub hackathon_subject: Option<Subject>,
    /// Identifier assigned to the hackathon record created by team generation.
    pub next_hackathon_id: u64,
    pub created_participants: Vec<NewParticipant>,
    pub created_jury_members: Vec<NewJuryMember>,
    pub mails: Vec<(MailKind, String)>,
    calls: Vec<String>,
    failing: HashMap<String, u16>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            state: HackathonState::Waiting,
            period: None,
            participants: Vec::new(),
            jury_members: Vec::new(),
            teams: Vec::new(),
            hackathons: Vec::new(),
            subjects: Vec::new(),
            hackathon_subject: None,
            next_hackathon_id: 1,
            created_participants: Vec::new(),
            created_jury_members: Vec::new(),
            mails: Vec::new(),
            calls: Vec::new(),
            failing: HashMap::new(),
        }
    }
}

/// Cloneable handle over a shared [`MemoryBackend`].
#[derive(Clone, Default)]
pub struct MemoryApi {
    inner: Arc<Mutex<MemoryBackend>>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the backend contents for setup or inspection.
    pub fn backend(&self) -> MutexGuard<'_, MemoryBackend> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every future call named `call` fail with a `500`.
    pub fn fail_on(&self, call: &str) {
        self.fail_with(call, 500);
    }

    /// Make every future call named `call` fail with `status`.
    pub fn fail_with(&self, call: &str, status: u16) {
        self.backend().failing.insert(call.to_string(), status);
    }

    pub fn recover(&self, call: &str) {
        self.backend().failing.remove(call);
    }

    /// Names of the calls received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.backend().calls.clone()
    }

    /// Number of received calls whose name starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.backend()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn clear_calls(&self) {
        self.backend().calls.clear();
    }

    fn handle<T, F>(&self, call: String, op: F) -> BoxFuture<'static, ApiResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut MemoryBackend) -> T,
    {
        let mut backend = self.backend();
        backend.calls.push(call.clone());
        let result = match backend.failing.get(&call) {
            Some(&status) => Err(ApiError::rejected(call, status)),
            None => Ok(op(&mut backend)),
        };
        Box::pin(ready(result))
    }
}

pub fn participant(first_name: &str, last_name: &str) -> Participant {
    Participant {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        ..Participant::default()
    }
}

pub fn jury_member(first_name: &str, idea: &str) -> JuryMember {
    JuryMember {
        first_name: first_name.to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        title: idea.to_string(),
        ..JuryMember::default()
    }
}

impl HackathonApi for MemoryApi {
    fn get_status(&self, id: u64) -> BoxFuture<'static, ApiResult<Status>> {
        self.handle("get_status".into(), |backend| Status {
            id: Some(id),
            state: backend.state,
        })
    }

    fn update_status(&self, id: u64, state: HackathonState) -> BoxFuture<'static, ApiResult<Status>> {
        self.handle(format!("update_status:{state}"), |backend| {
            backend.state = state;
            Status {
                id: Some(id),
                state,
            }
        })
    }

    fn get_period(&self, _id: u64) -> BoxFuture<'static, ApiResult<Option<Period>>> {
        self.handle("get_period".into(), |backend| backend.period.clone())
    }

    fn update_period(&self, id: u64, period: Period) -> BoxFuture<'static, ApiResult<Period>> {
        self.handle("update_period".into(), |backend| {
            let saved = Period {
                id: Some(id),
                ..period
            };
            backend.period = Some(saved.clone());
            saved
        })
    }

    fn create_period(&self, period: Period) -> BoxFuture<'static, ApiResult<Period>> {
        self.handle("create_period".into(), |backend| {
            backend.period = Some(period.clone());
            period
        })
    }

    fn list_participants(&self) -> BoxFuture<'static, ApiResult<Vec<Participant>>> {
        self.handle("list_participants".into(), |backend| {
            backend.participants.clone()
        })
    }

    fn list_jury_members(&self) -> BoxFuture<'static, ApiResult<Vec<JuryMember>>> {
        self.handle("list_jury_members".into(), |backend| {
            backend.jury_members.clone()
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, ApiResult<Vec<Team>>> {
        self.handle("list_teams".into(), |backend| backend.teams.clone())
    }

    fn list_subjects(&self) -> BoxFuture<'static, ApiResult<Vec<Subject>>> {
        self.handle("list_subjects".into(), |backend| backend.subjects.clone())
    }

    fn list_hackathons(&self) -> BoxFuture<'static, ApiResult<Vec<HackathonRecord>>> {
        self.handle("list_hackathons".into(), |backend| {
            backend.hackathons.clone()
        })
    }

    fn generate_hackathon(&self) -> BoxFuture<'static, ApiResult<GenerateResponse>> {
        self.handle("generate".into(), |backend| {
            let teams = backend
                .participants
                .chunks(2)
                .enumerate()
                .map(|(index, members)| Team {
                    id: Some(index as u64 + 1),
                    name: Some(format!("Team {}", index + 1)),
                    participants: members
                        .iter()
                        .cloned()
                        .map(TeamMember::Participant)
                        .collect(),
                })
                .collect::<Vec<_>>();
            let id = backend.next_hackathon_id;
            backend.hackathons.push(HackathonRecord {
                id: None,
                links: Links {
                    self_link: None,
                    jury_member: Some(Link {
                        href: format!("http://localhost:8080/hackathons/{id}/juryMember"),
                    }),
                },
            });
            backend.teams = teams.clone();
            GenerateResponse { teams }
        })
    }

    fn hackathon_subject(&self, hackathon_id: u64) -> BoxFuture<'static, ApiResult<Option<Subject>>> {
        self.handle(format!("hackathon_subject:{hackathon_id}"), |backend| {
            backend.hackathon_subject.clone()
        })
    }

    fn delete_all(&self, collection: BulkCollection) -> BoxFuture<'static, ApiResult<()>> {
        self.handle(format!("delete:{collection}"), |backend| match collection {
            BulkCollection::Hackathons => backend.hackathons.clear(),
            BulkCollection::Teams => backend.teams.clear(),
            BulkCollection::JuryMembers => backend.jury_members.clear(),
            BulkCollection::Participants => backend.participants.clear(),
        })
    }

    fn create_participant(&self, participant: NewParticipant) -> BoxFuture<'static, ApiResult<()>> {
        self.handle("create_participant".into(), |backend| {
            backend.participants.push(Participant {
                first_name: participant.first_name.clone(),
                last_name: participant.last_name.clone(),
                email: participant.email.clone(),
                skill: vec![participant.skill.clone()],
                ..Participant::default()
            });
            backend.created_participants.push(participant);
        })
    }

    fn create_jury_member(&self, jury_member: NewJuryMember) -> BoxFuture<'static, ApiResult<()>> {
        self.handle("create_jury_member".into(), |backend| {
            backend.jury_members.push(JuryMember {
                first_name: jury_member.first_name.clone(),
                last_name: jury_member.last_name.clone(),
                email: jury_member.email.clone(),
                ..JuryMember::default()
            });
            backend.created_jury_members.push(jury_member);
        })
    }

    fn create_subject(&self, subject: NewSubject) -> BoxFuture<'static, ApiResult<Subject>> {
        self.handle("create_subject".into(), |backend| {
            let created = Subject {
                id: Some((backend.subjects.len() + 1).to_string()),
                title: subject.title,
                description: subject.description,
                problem: subject.problem,
                innovation: subject.innovation,
                links: Links::default(),
            };
            backend.subjects.push(created.clone());
            created
        })
    }

    fn send_mail(&self, kind: MailKind, email: String) -> BoxFuture<'static, ApiResult<()>> {
        self.handle(format!("mail:{}", kind.endpoint()), |backend| {
            backend.mails.push((kind, email));
        })
    }
}
