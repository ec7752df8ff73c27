//! Domain sub-protocol contract tests

// ===== Domain Command Tags =====
pub const DOMAIN_SEND_MESSAGE: u8 = 0;
pub const DOMAIN_DELETE_OBJECT: u8 = 1;

// ===== Object Ids =====
pub const FIRST_OBJECT_ID: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::frame_service;
    use crate::test_helpers::*;
    use core_types::ObjectId;
    use ipc::{DomainCommand, Message, MessageKind};
    use ipc_dispatch::{Domain, SELF_OBJECT_ID};

    #[test]
    fn test_domain_command_tags_contract() {
        assert_eq!(
            DomainCommand::from_raw(DOMAIN_SEND_MESSAGE),
            Some(DomainCommand::SendMessage)
        );
        assert_eq!(
            DomainCommand::from_raw(DOMAIN_DELETE_OBJECT),
            Some(DomainCommand::DeleteObject)
        );
        assert_eq!(DomainCommand::SendMessage.as_raw(), DOMAIN_SEND_MESSAGE);
        assert_eq!(DomainCommand::DeleteObject.as_raw(), DOMAIN_DELETE_OBJECT);
        assert_eq!(DomainCommand::from_raw(2), None);
    }

    #[test]
    fn test_message_kind_contract() {
        assert_eq!(MessageKind::from_raw(2), MessageKind::CloseSession);
        assert_eq!(MessageKind::from_raw(4), MessageKind::Request);
        assert_eq!(MessageKind::from_raw(6), MessageKind::Request);
        assert_eq!(MessageKind::from_raw(5), MessageKind::Control);
        assert_eq!(MessageKind::from_raw(7), MessageKind::Control);
        assert_eq!(MessageKind::from_raw(3), MessageKind::Other(3));
    }

    #[test]
    fn test_object_id_assignment_contract() {
        assert_eq!(SELF_OBJECT_ID.as_raw(), FIRST_OBJECT_ID);

        let domain = Domain::promote(frame_service());
        let next = domain.add_service(frame_service()).unwrap();
        assert_eq!(next.as_raw(), FIRST_OBJECT_ID + 1);
    }

    #[test]
    fn test_delete_object_response_contract() {
        let (handles, handle) = open_direct(frame_service());
        dispatch(&handles, handle, &Message::control(raw_request(0, &[]))).unwrap();

        let request = Message::request(Vec::new())
            .with_domain(DomainCommand::DeleteObject, ObjectId::from_raw(40));
        let response = dispatch(&handles, handle, &request).unwrap();
        verify_frame_contract(&response.raw_payload, &response_header(0));
    }

    #[test]
    fn test_send_message_to_self_contract() {
        let (handles, handle) = open_direct(frame_service());
        dispatch(&handles, handle, &Message::control(raw_request(0, &[]))).unwrap();

        let request = Message::request(raw_request(5, &[]))
            .with_domain(DomainCommand::SendMessage, SELF_OBJECT_ID);
        let response = dispatch(&handles, handle, &request).unwrap();

        let mut expected = response_header(0);
        expected.extend_from_slice(&[1, 0, 0, 0]);
        verify_frame_contract(&response.raw_payload, &expected);
    }
}
