// File: punchpass-core/src/repositories/memory/members.rs

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::Member;
use punchpass_common::traits::repository_traits::MemberRepository;

#[derive(Default)]
pub struct MemoryMemberRepository {
    members: DashMap<Uuid, Member>,
}

impl MemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeding hook; member writes are otherwise out of scope here.
    pub fn insert(&self, member: Member) {
        self.members.insert(member.member_id, member);
    }
}

#[async_trait]
impl MemberRepository for MemoryMemberRepository {
    async fn get_member(&self, member_id: Uuid) -> Result<Option<Member>, Error> {
        Ok(self.members.get(&member_id).map(|m| m.clone()))
    }

    async fn find_member_by_card(&self, card_number: &str) -> Result<Option<Member>, Error> {
        Ok(self
            .members
            .iter()
            .find(|m| m.card_number.as_deref() == Some(card_number))
            .map(|m| m.clone()))
    }
}
