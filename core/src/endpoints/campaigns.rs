//! Newsletter campaigns: sending, scheduling and per-campaign reports.

use crate::client::PigeonClient;
use crate::endpoints::with_query;
use crate::error::PigeonResult;
use crate::response::Response;
use crate::types::{CampaignQuery, CampaignRequest, RequestOptions};

const ENDPOINT: &str = "campaigns";

#[derive(Debug, Clone)]
pub struct CampaignsApi {
    client: PigeonClient,
}

impl CampaignsApi {
    pub(crate) fn new(client: PigeonClient) -> Self {
        Self { client }
    }

    /// GET /campaigns[?from_id=&start_date=&end_date=]
    pub fn get_all(&self, query: &CampaignQuery) -> PigeonResult<Response> {
        self.client.get(&with_query(ENDPOINT, query.pairs()), RequestOptions::new())
    }

    /// Create a campaign and start sending it immediately.
    ///
    /// POST /campaigns
    pub fn send(&self, campaign: &CampaignRequest) -> PigeonResult<Response> {
        self.client.post(ENDPOINT, RequestOptions::json(campaign)?)
    }

    /// Create a campaign sent at `schedule_for` (ISO-8601, in the future).
    ///
    /// POST /campaigns
    pub fn schedule(&self, campaign: &CampaignRequest, schedule_for: &str) -> PigeonResult<Response> {
        let mut scheduled = campaign.clone();
        scheduled.schedule_for = Some(schedule_for.to_string());
        self.client.post(ENDPOINT, RequestOptions::json(&scheduled)?)
    }

    /// Delivery counters for one campaign.
    ///
    /// GET /campaigns/<id>
    pub fn report(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.client.get(&format!("{ENDPOINT}/{campaign_id}"), RequestOptions::new())
    }

    /// Delete a scheduled campaign.
    ///
    /// DELETE /campaigns/<id>
    pub fn delete(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.client.delete(&format!("{ENDPOINT}/{campaign_id}"), RequestOptions::new())
    }

    pub fn opened(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.events(campaign_id, "opened")
    }

    pub fn clicked(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.events(campaign_id, "clicked")
    }

    pub fn bounced(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.events(campaign_id, "bounced")
    }

    pub fn unsubscribed(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.events(campaign_id, "unsubscribed")
    }

    pub fn spam(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.events(campaign_id, "spam")
    }

    pub fn all_subscribers(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.events(campaign_id, "all_subscribers")
    }

    pub fn delivered(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.events(campaign_id, "delivered")
    }

    pub fn non_opens(&self, campaign_id: i64) -> PigeonResult<Response> {
        self.events(campaign_id, "non_opens")
    }

    // GET /campaigns/<id>/<kind>
    fn events(&self, campaign_id: i64, kind: &str) -> PigeonResult<Response> {
        self.client
            .get(&format!("{ENDPOINT}/{campaign_id}/{kind}"), RequestOptions::new())
    }
}
