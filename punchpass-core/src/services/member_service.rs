// File: punchpass-core/src/services/member_service.rs

use std::sync::Arc;

use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::Member;
use punchpass_common::traits::repository_traits::MemberRepository;

/// Read-side member lookups for the staff POS: locate the member whose
/// ticket is being redeemed on their behalf.
pub struct MemberService {
    members: Arc<dyn MemberRepository>,
}

impl MemberService {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn get_member(&self, member_id: Uuid) -> Result<Member, Error> {
        self.members
            .get_member(member_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("member {member_id}")))
    }

    pub async fn find_member_by_card(&self, card_number: &str) -> Result<Member, Error> {
        let card = card_number.trim();
        if card.is_empty() {
            return Err(Error::Validation("card number must not be empty".to_string()));
        }
        let maybe = self.members.find_member_by_card(card).await?;
        if let Some(m) = maybe {
            Ok(m)
        } else {
            Err(Error::NotFound(format!("no member with card '{card}'")))
        }
    }
}
