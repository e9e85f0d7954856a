use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use crate::dao::{
    backend::{BulkCollection, HackathonApi, MailKind},
    error::ApiResult,
    listing::extract_entities,
    models::{
        GenerateResponse, HackathonRecord, HackathonState, JuryMember, NewJuryMember,
        NewParticipant, NewSubject, Participant, Period, Status, Subject, Team,
    },
};

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
};

/// reqwest-based client for the hackathon REST backend.
#[derive(Clone)]
pub struct RestHackathonApi {
    client: Client,
    base_url: Arc<str>,
    base: Url,
}

impl RestHackathonApi {
    /// Build the HTTP client; no request is issued until the first call.
    pub fn new(config: RestConfig) -> RestResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let base_url = config.base_url.trim_end_matches('/');
        let base = Url::parse(base_url).map_err(|_| RestDaoError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(RestDaoError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: Arc::<str>::from(base_url),
            base,
        })
    }

    /// `mails/<endpoint>/<email>` with the address percent-encoded as one segment.
    fn mail_url(&self, kind: MailKind, email: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["mails", kind.endpoint(), email.trim()]);
        }
        url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client.request(method, url)
    }

    async fn execute(&self, builder: RequestBuilder, path: &str) -> RestResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(path, %status, "backend responded");
        if status.is_success() {
            Ok(response)
        } else {
            Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status,
            })
        }
    }

    async fn decode<T>(response: Response, path: &str) -> RestResult<T>
    where
        T: DeserializeOwned,
    {
        response
            .json::<T>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn get_json<T>(&self, path: &str) -> RestResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(self.request(Method::GET, path), path).await?;
        Self::decode(response, path).await
    }

    /// GET that maps `404` and empty bodies to `None`.
    async fn get_optional<T>(&self, path: &str) -> RestResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = match self.execute(self.request(Method::GET, path), path).await {
            Ok(response) => response,
            Err(RestDaoError::RequestStatus {
                status: StatusCode::NOT_FOUND,
                ..
            }) => return Ok(None),
            Err(err) => return Err(err),
        };

        let body = response
            .bytes()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| RestDaoError::DeserializeValue {
                path: path.to_string(),
                source,
            })
    }

    async fn get_list<T>(&self, path: &str, embedded_key: &str) -> RestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let body = self.get_optional::<Value>(path).await?;
        Ok(extract_entities(body, embedded_key))
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> RestResult<T>
    where
        B: ?Sized + Serialize,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path).json(body);
        let response = self.execute(builder, path).await?;
        Self::decode(response, path).await
    }

    /// Issue a request whose response body is irrelevant.
    async fn send_discarding(&self, builder: RequestBuilder, path: &str) -> RestResult<()> {
        self.execute(builder, path).await.map(|_| ())
    }
}

impl HackathonApi for RestHackathonApi {
    fn get_status(&self, id: u64) -> BoxFuture<'static, ApiResult<Status>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("status/{id}");
            api.get_json(&path).await.map_err(Into::into)
        })
    }

    fn update_status(&self, id: u64, state: HackathonState) -> BoxFuture<'static, ApiResult<Status>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("status/{id}");
            api.send_json(Method::PUT, &path, &json!({ "state": state }))
                .await
                .map_err(Into::into)
        })
    }

    fn get_period(&self, id: u64) -> BoxFuture<'static, ApiResult<Option<Period>>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("periods/{id}");
            api.get_optional(&path).await.map_err(Into::into)
        })
    }

    fn update_period(&self, id: u64, period: Period) -> BoxFuture<'static, ApiResult<Period>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("periods/{id}");
            api.send_json(Method::PUT, &path, &period)
                .await
                .map_err(Into::into)
        })
    }

    fn create_period(&self, period: Period) -> BoxFuture<'static, ApiResult<Period>> {
        let api = self.clone();
        Box::pin(async move {
            api.send_json(Method::POST, "periods", &period)
                .await
                .map_err(Into::into)
        })
    }

    fn list_participants(&self) -> BoxFuture<'static, ApiResult<Vec<Participant>>> {
        let api = self.clone();
        Box::pin(async move {
            api.get_list("participants", "participantEntities")
                .await
                .map_err(Into::into)
        })
    }

    fn list_jury_members(&self) -> BoxFuture<'static, ApiResult<Vec<JuryMember>>> {
        let api = self.clone();
        Box::pin(async move {
            api.get_list("jury-members", "juryMemberEntities")
                .await
                .map_err(Into::into)
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, ApiResult<Vec<Team>>> {
        let api = self.clone();
        Box::pin(async move {
            api.get_list("teams/all", "teamEntities")
                .await
                .map_err(Into::into)
        })
    }

    fn list_subjects(&self) -> BoxFuture<'static, ApiResult<Vec<Subject>>> {
        let api = self.clone();
        Box::pin(async move {
            api.get_list("subjects", "subjectEntities")
                .await
                .map_err(Into::into)
        })
    }

    fn list_hackathons(&self) -> BoxFuture<'static, ApiResult<Vec<HackathonRecord>>> {
        let api = self.clone();
        Box::pin(async move {
            api.get_list("hackathons", "hackathonEntities")
                .await
                .map_err(Into::into)
        })
    }

    fn generate_hackathon(&self) -> BoxFuture<'static, ApiResult<GenerateResponse>> {
        let api = self.clone();
        Box::pin(async move {
            api.send_json(Method::POST, "hackathons/generate", &json!({}))
                .await
                .map_err(Into::into)
        })
    }

    fn hackathon_subject(&self, hackathon_id: u64) -> BoxFuture<'static, ApiResult<Option<Subject>>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("hackathons/{hackathon_id}/juryMember");
            api.get_optional(&path).await.map_err(Into::into)
        })
    }

    fn delete_all(&self, collection: BulkCollection) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("{}/delete", collection.resource());
            let builder = api.request(Method::DELETE, &path);
            api.send_discarding(builder, &path).await.map_err(Into::into)
        })
    }

    fn create_participant(&self, participant: NewParticipant) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let builder = api.request(Method::POST, "participants").json(&participant);
            api.send_discarding(builder, "participants")
                .await
                .map_err(Into::into)
        })
    }

    fn create_jury_member(&self, jury_member: NewJuryMember) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let builder = api.request(Method::POST, "jury-members").json(&jury_member);
            api.send_discarding(builder, "jury-members")
                .await
                .map_err(Into::into)
        })
    }

    fn create_subject(&self, subject: NewSubject) -> BoxFuture<'static, ApiResult<Subject>> {
        let api = self.clone();
        Box::pin(async move {
            api.send_json(Method::POST, "subjects", &subject)
                .await
                .map_err(Into::into)
        })
    }

    fn send_mail(&self, kind: MailKind, email: String) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("mails/{}", kind.endpoint());
            let builder = api.client.request(Method::GET, api.mail_url(kind, &email));
            api.send_discarding(builder, &path).await.map_err(Into::into)
        })
    }
}
