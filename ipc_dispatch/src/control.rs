//! Control-channel handler
//!
//! Control commands manage the session itself and never reach a service
//! command table. The handler is a pure function of its inputs: it reports
//! the output words and the session change the caller must apply to the
//! handle table.

use crate::config::DispatchConfig;
use crate::domain::SELF_OBJECT_ID;
use crate::error::{DispatchError, UnimplementedTarget};
use crate::session::{promote_to_domain, Session, SessionRef};
use core_types::ObjectId;
use ipc::{ByteReader, CommandId};
use std::sync::Arc;

/// Control command ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    /// Promote the session to a domain
    ConvertToDomain,
    /// Duplicate the session handle
    CloneObject,
    /// Report the host pointer buffer capacity
    QueryPointerBufferSize,
    /// Duplicate the session handle, with an extra tag field
    CloneObjectEx,
}

impl ControlCommand {
    /// Resolves a control command id
    pub fn from_id(command_id: CommandId) -> Option<Self> {
        match command_id {
            0 => Some(ControlCommand::ConvertToDomain),
            2 => Some(ControlCommand::CloneObject),
            3 => Some(ControlCommand::QueryPointerBufferSize),
            4 => Some(ControlCommand::CloneObjectEx),
            _ => None,
        }
    }

    pub fn id(&self) -> CommandId {
        match self {
            ControlCommand::ConvertToDomain => 0,
            ControlCommand::CloneObject => 2,
            ControlCommand::QueryPointerBufferSize => 3,
            ControlCommand::CloneObjectEx => 4,
        }
    }
}

/// Change to apply to the handle table after a control command
#[derive(Debug, Clone)]
pub enum SessionMutation {
    None,
    /// Rebind the calling handle to this session
    Rebind(SessionRef),
    /// Open a new handle on this session and move it to the caller
    Duplicate(SessionRef),
}

/// Result of a control command
#[derive(Debug, Clone)]
pub struct ControlOutcome {
    /// Output words, little-endian on the wire
    pub words: Vec<u32>,
    pub mutation: SessionMutation,
}

impl ControlOutcome {
    fn words(words: Vec<u32>) -> Self {
        Self {
            words,
            mutation: SessionMutation::None,
        }
    }
}

/// Executes a control command against `session`
///
/// `domain_target` is the object id from the request's domain sub-header, if
/// it carried one. `parameters` is positioned after the command header.
pub fn handle_control(
    command_id: CommandId,
    session: &SessionRef,
    domain_target: Option<ObjectId>,
    mut parameters: ByteReader<'_>,
    config: &DispatchConfig,
) -> Result<ControlOutcome, DispatchError> {
    let command = ControlCommand::from_id(command_id).ok_or_else(|| {
        DispatchError::unimplemented(
            UnimplementedTarget::ControlCommand(command_id),
            session.kind(),
            session.service_name(),
        )
    })?;

    match command {
        ControlCommand::ConvertToDomain => {
            let domain =
                promote_to_domain(session).ok_or(DispatchError::InvalidControlTarget {
                    command_id,
                    session: session.kind(),
                })?;
            Ok(ControlOutcome {
                words: vec![SELF_OBJECT_ID.as_raw()],
                mutation: SessionMutation::Rebind(Session::domain(domain)),
            })
        }
        ControlCommand::QueryPointerBufferSize => {
            Ok(ControlOutcome::words(vec![config.pointer_buffer_size]))
        }
        ControlCommand::CloneObject | ControlCommand::CloneObjectEx => {
            // Reserved field; read but not interpreted.
            parameters.read_u32()?;
            let alias = duplicate_target(session, domain_target)?;
            Ok(ControlOutcome {
                words: Vec::new(),
                mutation: SessionMutation::Duplicate(alias),
            })
        }
    }
}

/// Picks what a duplicated handle aliases
///
/// A domain session duplicating through a domain sub-header aliases the
/// addressed object as a wrapped session; everything else aliases the
/// session itself.
fn duplicate_target(
    session: &SessionRef,
    domain_target: Option<ObjectId>,
) -> Result<SessionRef, DispatchError> {
    match (session.as_domain(), domain_target) {
        (Some(domain), Some(object_id)) => {
            let object = domain.get(object_id).ok_or_else(|| {
                DispatchError::unimplemented(
                    UnimplementedTarget::DomainObject(object_id),
                    session.kind(),
                    session.service_name(),
                )
            })?;
            Ok(Session::wrapped(object))
        }
        _ => Ok(Arc::clone(session)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandTable, TableService};
    use crate::domain::{Domain, DomainObject};
    use crate::session::SessionKind;
    use ipc::FrameError;

    fn direct(name: &str) -> SessionRef {
        Session::direct(TableService::shared(name, CommandTable::new()))
    }

    #[test]
    fn test_control_command_ids() {
        for id in [0, 2, 3, 4] {
            assert_eq!(ControlCommand::from_id(id).unwrap().id(), id);
        }
        assert!(ControlCommand::from_id(1).is_none());
        assert!(ControlCommand::from_id(5).is_none());
    }

    #[test]
    fn test_query_pointer_buffer_size() {
        let session = direct("hid");
        let outcome = handle_control(
            3,
            &session,
            None,
            ByteReader::new(&[0xff; 8]),
            &DispatchConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.words, vec![0x500]);
        assert!(matches!(outcome.mutation, SessionMutation::None));
    }

    #[test]
    fn test_query_pointer_buffer_size_from_config() {
        let session = direct("hid");
        let config = DispatchConfig::default().with_pointer_buffer_size(0x8000);
        let outcome = handle_control(3, &session, None, ByteReader::new(&[]), &config).unwrap();
        assert_eq!(outcome.words, vec![0x8000]);
    }

    #[test]
    fn test_convert_to_domain_rebinds() {
        let session = direct("fsp-srv");
        let outcome = handle_control(
            0,
            &session,
            None,
            ByteReader::new(&[]),
            &DispatchConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.words, vec![1]);
        match outcome.mutation {
            SessionMutation::Rebind(rebound) => {
                assert_eq!(rebound.kind(), SessionKind::Domain);
                assert_eq!(rebound.service_name(), "fsp-srv");
            }
            other => panic!("Expected rebind, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_domain_session_is_invalid() {
        let session = Session::domain(Domain::promote(TableService::shared(
            "fsp-srv",
            CommandTable::new(),
        )));
        let result = handle_control(
            0,
            &session,
            None,
            ByteReader::new(&[]),
            &DispatchConfig::default(),
        );

        assert!(matches!(
            result,
            Err(DispatchError::InvalidControlTarget {
                command_id: 0,
                session: SessionKind::Domain
            })
        ));
    }

    #[test]
    fn test_clone_aliases_same_session() {
        let session = direct("acc:u0");
        for command_id in [2, 4] {
            let outcome = handle_control(
                command_id,
                &session,
                None,
                ByteReader::new(&[0, 0, 0, 0]),
                &DispatchConfig::default(),
            )
            .unwrap();

            assert!(outcome.words.is_empty());
            match outcome.mutation {
                SessionMutation::Duplicate(alias) => assert!(Arc::ptr_eq(&alias, &session)),
                other => panic!("Expected duplicate, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_clone_requires_reserved_field() {
        let session = direct("acc:u0");
        let result = handle_control(
            2,
            &session,
            None,
            ByteReader::new(&[0, 0]),
            &DispatchConfig::default(),
        );

        assert!(matches!(
            result,
            Err(DispatchError::MalformedFrame(FrameError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_clone_domain_object_wraps_it() {
        let domain = Domain::promote(TableService::shared("fsp-srv", CommandTable::new()));
        let child = domain
            .add_service(TableService::shared("IFile", CommandTable::new()))
            .unwrap();
        let session = Session::domain(domain);

        let outcome = handle_control(
            2,
            &session,
            Some(child),
            ByteReader::new(&[0, 0, 0, 0]),
            &DispatchConfig::default(),
        )
        .unwrap();

        match outcome.mutation {
            SessionMutation::Duplicate(alias) => {
                assert_eq!(alias.kind(), SessionKind::Wrapped);
                assert_eq!(alias.service_name(), "IFile");
            }
            other => panic!("Expected duplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_clone_missing_domain_object() {
        let domain = Domain::promote(TableService::shared("fsp-srv", CommandTable::new()));
        let session = Session::domain(domain);

        let result = handle_control(
            4,
            &session,
            Some(ObjectId::from_raw(9)),
            ByteReader::new(&[0; 4]),
            &DispatchConfig::default(),
        );

        assert!(matches!(
            result,
            Err(DispatchError::Unimplemented {
                target: UnimplementedTarget::DomainObject(_),
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_control_command() {
        let session = direct("hid");
        let result = handle_control(
            1,
            &session,
            None,
            ByteReader::new(&[]),
            &DispatchConfig::default(),
        );

        match result {
            Err(DispatchError::Unimplemented {
                target, session, ..
            }) => {
                assert_eq!(target, UnimplementedTarget::ControlCommand(1));
                assert_eq!(session, SessionKind::Direct);
            }
            other => panic!("Expected unimplemented, got {:?}", other),
        }
    }

    #[test]
    fn test_wrapped_domain_alias_cannot_promote() {
        let domain = Domain::promote(TableService::shared("fsp-srv", CommandTable::new()));
        let session = Session::wrapped(DomainObject::Domain(Arc::downgrade(&domain)));
        let result = handle_control(
            0,
            &session,
            None,
            ByteReader::new(&[]),
            &DispatchConfig::default(),
        );
        assert!(matches!(
            result,
            Err(DispatchError::InvalidControlTarget { .. })
        ));
    }
}
