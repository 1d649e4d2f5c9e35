use super::record_type_map::RecordTypeMapper;
use super::wire;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, ResponseCode};
use rotor_dns_application::use_cases::HandleDnsQueryUseCase;
use rotor_dns_domain::{AnswerRecord, DnsRequest, RecordType, ZoneDefaults};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Payload every DNS client must accept over UDP.
const MIN_UDP_PAYLOAD: u16 = 512;

/// Payload advertised back to EDNS clients.
const EDNS_PAYLOAD: u16 = 1232;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

/// Turns raw query bytes into raw reply bytes.
///
/// Shared by the UDP and TCP listeners; holds nothing mutable.
#[derive(Clone)]
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
    zone: Arc<ZoneDefaults>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>, zone: Arc<ZoneDefaults>) -> Self {
        Self { use_case, zone }
    }

    /// Returns `None` only when nothing sensible can be sent back, i.e. the
    /// message is too short to carry an id.
    pub async fn handle_raw(
        &self,
        bytes: &[u8],
        client_ip: IpAddr,
        transport: Transport,
    ) -> Option<Vec<u8>> {
        let request = match Message::from_vec(bytes) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, client = %client_ip, "Malformed DNS message");
                return Self::header_id(bytes).and_then(|id| {
                    encode(&Message::error_msg(id, OpCode::Query, ResponseCode::FormErr))
                });
            }
        };

        if request.message_type() != MessageType::Query {
            debug!(client = %client_ip, "Ignoring DNS response sent to server");
            return None;
        }

        if request.op_code() != OpCode::Query {
            debug!(op_code = ?request.op_code(), client = %client_ip, "Unsupported opcode");
            return encode(&Message::error_msg(
                request.id(),
                request.op_code(),
                ResponseCode::NotImp,
            ));
        }

        let Some(question) = request.queries().first().cloned() else {
            return encode(&Message::error_msg(
                request.id(),
                OpCode::Query,
                ResponseCode::FormErr,
            ));
        };

        let query_name = question.name().to_ascii();
        let record_type = RecordTypeMapper::from_hickory(question.query_type());
        let dns_request = DnsRequest::new(&query_name, record_type, client_ip, bytes.to_vec());
        let domain = dns_request.domain().to_string();

        info!(domain = %domain, record_type = %record_type, client = %client_ip, "DNS query received");

        let resolution = self.use_case.execute(&dns_request).await;

        let mut response = Message::new();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(OpCode::Query)
            .set_authoritative(true)
            .set_recursion_desired(request.recursion_desired())
            .set_recursion_available(false)
            .set_response_code(ResponseCode::NoError);
        response.add_query(question);

        if request.extensions().is_some() {
            let mut edns = Edns::new();
            edns.set_max_payload(EDNS_PAYLOAD);
            response.set_edns(edns);
        }

        let soa = self.zone.soa_record();
        let answer = resolution
            .answer
            .as_ref()
            .and_then(|a| a.try_answer(&dns_request.query))
            .or_else(|| self.apex_soa(&domain, record_type, &soa));

        match answer {
            Some(answer) => match wire::to_record(answer, &domain) {
                Ok(record) => {
                    debug!(domain = %domain, answer = %answer.summary(), "Sending answer");
                    response.add_answer(record);
                }
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Failed to encode answer");
                    response.set_response_code(ResponseCode::ServFail);
                }
            },
            None if dns_request.query.is_within(&self.zone.server_domain) => {
                debug!(domain = %domain, "No records found (NODATA)");
                match wire::to_record(&soa, &domain) {
                    Ok(record) => {
                        response.add_name_server(record);
                    }
                    Err(e) => warn!(error = %e, "Failed to encode SOA"),
                }
            }
            None => debug!(domain = %domain, "No answer outside served zone"),
        }

        let encoded = encode(&response)?;
        if transport == Transport::Udp {
            let limit = request
                .extensions()
                .as_ref()
                .map(|edns| edns.max_payload().max(MIN_UDP_PAYLOAD))
                .unwrap_or(MIN_UDP_PAYLOAD) as usize;
            if encoded.len() > limit {
                debug!(domain = %domain, size = encoded.len(), limit, "Truncating UDP reply");
                return Self::truncated(&response);
            }
        }

        Some(encoded)
    }

    /// SOA questions for the zone apex are answered from the static record.
    fn apex_soa<'a>(
        &self,
        domain: &str,
        record_type: RecordType,
        soa: &'a AnswerRecord,
    ) -> Option<&'a AnswerRecord> {
        (matches!(record_type, RecordType::SOA | RecordType::ANY)
            && domain == self.zone.server_domain.as_ref())
        .then_some(soa)
    }

    fn truncated(response: &Message) -> Option<Vec<u8>> {
        let mut short = Message::new();
        short
            .set_id(response.id())
            .set_message_type(MessageType::Response)
            .set_op_code(OpCode::Query)
            .set_authoritative(true)
            .set_recursion_desired(response.recursion_desired())
            .set_truncated(true)
            .set_response_code(response.response_code());
        for query in response.queries() {
            short.add_query(query.clone());
        }
        encode(&short)
    }

    fn header_id(bytes: &[u8]) -> Option<u16> {
        match bytes {
            [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }
}

fn encode(message: &Message) -> Option<Vec<u8>> {
    match message.to_vec() {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(error = %e, "Failed to encode DNS response");
            None
        }
    }
}
