use protoscan_testing::{END_GROUP, MessageBuilder, START_GROUP, TestCases, encode_varint};
use quickcheck_macros::quickcheck;

use super::{
    Decision, DecodePolicy, ErrorKind, FieldPath, FnPolicy, ParseOptions, Parser, WireType,
    parse, parse_with_options,
};

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Decide { number: u64, parent: Vec<u64> },
    Field {
        wire_type: WireType,
        number: u64,
        value: Vec<u8>,
        path: String,
    },
}

/// Policy which makes decisions from a table of full field paths and records
/// every callback.
struct Recorder {
    decisions: Vec<(Vec<u64>, Decision)>,
    default: Decision,
    events: Vec<Event>,
}

impl Recorder {
    fn new(decisions: &[(&[u64], Decision)]) -> Self {
        Self {
            decisions: decisions.iter().map(|(p, d)| (p.to_vec(), *d)).collect(),
            default: Decision::Skip,
            events: Vec::new(),
        }
    }

    fn with_default(mut self, default: Decision) -> Self {
        self.default = default;
        self
    }

    fn fields(&self) -> Vec<(u64, Vec<u8>, String)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Field {
                    number,
                    value,
                    path,
                    ..
                } => Some((*number, value.clone(), path.clone())),
                Event::Decide { .. } => None,
            })
            .collect()
    }
}

impl DecodePolicy for Recorder {
    fn decide(&mut self, number: u64, parent: FieldPath) -> Decision {
        self.events.push(Event::Decide {
            number,
            parent: parent.to_vec(),
        });
        self.decisions
            .iter()
            .find(|(path, _)| parent.child_matches(number, path))
            .map(|(_, decision)| *decision)
            .unwrap_or(self.default)
    }

    fn on_field(&mut self, wire_type: WireType, number: u64, value: &[u8], path: FieldPath) {
        assert_eq!(path.last(), Some(number));
        self.events.push(Event::Field {
            wire_type,
            number,
            value: value.to_vec(),
            path: path.to_string(),
        });
    }
}

fn fee_tx() -> Vec<u8> {
    let coin = MessageBuilder::new()
        .string(1, "uatom")
        .string(2, "5000");
    let fee = MessageBuilder::new()
        .message(1, coin)
        .string(3, "payer");
    let auth_info = MessageBuilder::new()
        .message(1, MessageBuilder::new().string(1, "signer"))
        .message(2, fee)
        .bytes(3, [0xff; 10]);
    MessageBuilder::new()
        .message(1, MessageBuilder::new().string(1, "body"))
        .message(2, auth_info)
        .bytes(3, [0xab; 64])
        .build()
}

fn fee_decisions() -> Recorder {
    Recorder::new(&[
        (&[2], Decision::ParseAsMessage),
        (&[2, 2], Decision::ParseAsMessage),
        (&[2, 2, 1], Decision::ParseAsMessage),
        (&[2, 2, 1, 1], Decision::CaptureBytes),
        (&[2, 2, 1, 2], Decision::CaptureBytes),
    ])
}

#[test]
fn test_parse_scalars() {
    let msg = MessageBuilder::new()
        .varint(1, 150)
        .fixed32(2, 0xdead_beef)
        .fixed64(3, 1)
        .varint(4, 0)
        .build();

    let mut recorder = Recorder::new(&[]);
    parse(&msg, &mut recorder).unwrap();

    assert_eq!(
        recorder.events,
        [
            Event::Field {
                wire_type: WireType::Varint,
                number: 1,
                value: vec![150],
                path: "1".into(),
            },
            Event::Field {
                wire_type: WireType::Fixed32,
                number: 2,
                value: 0xdead_beefu32.to_le_bytes().to_vec(),
                path: "2".into(),
            },
            Event::Field {
                wire_type: WireType::Fixed64,
                number: 3,
                value: 1u64.to_le_bytes().to_vec(),
                path: "3".into(),
            },
            Event::Field {
                wire_type: WireType::Varint,
                number: 4,
                value: vec![0],
                path: "4".into(),
            },
        ]
    );
}

#[test]
fn test_skip_siblings() {
    let msg = MessageBuilder::new()
        .string(1, "first")
        .string(2, "second")
        // Bytes which would be invalid if mis-parsed as fields.
        .bytes(3, [0x0b, 0x0c, 0xff, 0xff])
        .build();

    let mut recorder = Recorder::new(&[(&[2], Decision::CaptureBytes)]);
    parse(&msg, &mut recorder).unwrap();

    assert_eq!(recorder.fields(), [(2, b"second".to_vec(), "2".into())]);
    assert_eq!(
        recorder.events.first(),
        Some(&Event::Decide {
            number: 1,
            parent: vec![]
        })
    );
}

#[test]
fn test_nested_capture() {
    let mut recorder = fee_decisions();
    parse(&fee_tx(), &mut recorder).unwrap();

    assert_eq!(
        recorder.fields(),
        [
            (1, b"uatom".to_vec(), "2:2:1:1".into()),
            (2, b"5000".to_vec(), "2:2:1:2".into()),
        ]
    );

    // Decisions are requested with the path of the enclosing message.
    let decided: Vec<(u64, Vec<u64>)> = recorder
        .events
        .iter()
        .filter_map(|event| match event {
            Event::Decide { number, parent } => Some((*number, parent.clone())),
            Event::Field { .. } => None,
        })
        .collect();
    assert_eq!(
        decided,
        [
            (1, vec![]),
            (2, vec![]),
            (1, vec![2]),
            (2, vec![2]),
            (1, vec![2, 2]),
            (1, vec![2, 2, 1]),
            (2, vec![2, 2, 1]),
            (3, vec![2, 2]),
            (3, vec![2]),
            (3, vec![]),
        ]
    );
}

#[test]
fn test_scalars_inside_messages() {
    let msg = MessageBuilder::new()
        .message(
            5,
            MessageBuilder::new()
                .varint(1, 1)
                .message(2, MessageBuilder::new().fixed32(7, 3)),
        )
        .varint(6, 2)
        .build();

    let mut recorder = Recorder::new(&[]).with_default(Decision::ParseAsMessage);
    parse(&msg, &mut recorder).unwrap();

    assert_eq!(
        recorder.fields(),
        [
            (1, vec![1], "5:1".into()),
            (7, vec![3, 0, 0, 0], "5:2:7".into()),
            (6, vec![2], "6".into()),
        ]
    );
}

#[test]
fn test_empty_message() {
    let mut recorder = Recorder::new(&[]);
    let mut parser = Parser::new(&[]);
    parser.parse(&mut recorder).unwrap();
    assert!(recorder.events.is_empty());
    assert_eq!(parser.fields_visited(), 0);
}

#[test]
fn test_empty_submessages() {
    // Empty embedded messages must be closed immediately, otherwise the
    // following fields would be treated as their children.
    let msg = MessageBuilder::new()
        .message(1, MessageBuilder::new())
        .message(2, MessageBuilder::new().message(3, MessageBuilder::new()))
        .varint(4, 9)
        .message(5, MessageBuilder::new())
        .build();

    let mut recorder = Recorder::new(&[]).with_default(Decision::ParseAsMessage);
    let mut parser = Parser::new(&msg);
    parser.parse(&mut recorder).unwrap();

    assert_eq!(recorder.fields(), [(4, vec![9], "4".into())]);
    assert_eq!(parser.fields_visited(), 5);
}

#[test]
fn test_fields_visited() {
    let mut recorder = fee_decisions();
    let mut parser = Parser::new(&[]);
    parser.parse(&mut recorder).unwrap();

    let tx = fee_tx();
    let mut parser = Parser::new(&tx);
    parser.parse(&mut recorder).unwrap();

    // Keys of skipped messages' children are never read.
    assert_eq!(parser.fields_visited(), 10);
}

#[test]
fn test_parse_errors() {
    #[derive(Debug)]
    struct Case {
        msg: Vec<u8>,
        decisions: Vec<(Vec<u64>, Decision)>,
        expected: ErrorKind,
    }

    let capture_1 = vec![(vec![1], Decision::CaptureBytes)];
    let message_1 = vec![(vec![1], Decision::ParseAsMessage)];

    let cases = [
        // Truncated key.
        Case {
            msg: vec![0x88],
            decisions: vec![],
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        // Truncated varint value.
        Case {
            msg: vec![0x08, 0x96],
            decisions: vec![],
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        // Truncated fixed-width values.
        Case {
            msg: vec![0x0d, 1, 2, 3],
            decisions: vec![],
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        Case {
            msg: vec![0x09, 1, 2, 3, 4, 5, 6, 7],
            decisions: vec![],
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        // Truncated length prefix.
        Case {
            msg: vec![0x0a],
            decisions: vec![],
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        // Truncated payload for each decision.
        Case {
            msg: vec![0x0a, 0x05, b'a', b'b'],
            decisions: vec![],
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        Case {
            msg: vec![0x0a, 0x05, b'a', b'b'],
            decisions: capture_1.clone(),
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        Case {
            msg: vec![0x0a, 0x05, 0x08, 0x01],
            decisions: message_1.clone(),
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        // Length which doesn't fit in memory.
        Case {
            msg: MessageBuilder::new()
                .key(2, 1)
                .raw(encode_varint(u64::MAX))
                .build(),
            decisions: capture_1.clone(),
            expected: ErrorKind::UnexpectedEndOfStream,
        },
        // Group wire types.
        Case {
            msg: MessageBuilder::new().key(START_GROUP, 1).build(),
            decisions: vec![],
            expected: ErrorKind::UnsupportedWireType(3),
        },
        Case {
            msg: MessageBuilder::new()
                .varint(1, 1)
                .key(END_GROUP, 1)
                .build(),
            decisions: vec![],
            expected: ErrorKind::UnsupportedWireType(4),
        },
        // Child field which extends past the end of its parent.
        Case {
            msg: vec![0x0a, 0x02, 0x12, 0x02, 0x00, 0x00],
            decisions: message_1.clone(),
            expected: ErrorKind::MessageOverrun,
        },
        Case {
            msg: vec![0x0a, 0x01, 0x08, 0x96, 0x01],
            decisions: message_1.clone(),
            expected: ErrorKind::MessageOverrun,
        },
        // Embedded message which extends past the end of its parent.
        Case {
            msg: vec![0x0a, 0x02, 0x0a, 0x03, 0x08, 0x01, 0x00],
            decisions: vec![
                (vec![1], Decision::ParseAsMessage),
                (vec![1, 1], Decision::ParseAsMessage),
            ],
            expected: ErrorKind::MessageOverrun,
        },
    ];

    cases.test_each(|case| {
        let decisions: Vec<(&[u64], Decision)> = case
            .decisions
            .iter()
            .map(|(path, decision)| (path.as_slice(), *decision))
            .collect();
        let mut recorder = Recorder::new(&decisions);
        let err = parse(&case.msg, &mut recorder).err().unwrap();
        assert_eq!(err.kind(), &case.expected);
    })
}

#[test]
fn test_truncated_capture_is_not_delivered() {
    // The amount field claims four bytes but the input ends after two.
    let coin = MessageBuilder::new()
        .string(1, "uatom")
        .key(2, 2)
        .raw([4, b'5', b'0']);
    let fee = MessageBuilder::new().message(1, coin);
    let tx = MessageBuilder::new()
        .message(2, MessageBuilder::new().message(2, fee))
        .build();

    let mut recorder = fee_decisions();
    let err = parse(&tx, &mut recorder).err().unwrap();

    assert_eq!(err.kind(), &ErrorKind::UnexpectedEndOfStream);
    assert_eq!(err.path(), "2:2:1:2");
    assert_eq!(recorder.fields(), [(1, b"uatom".to_vec(), "2:2:1:1".into())]);
}

#[test]
fn test_error_context() {
    let msg = MessageBuilder::new()
        .varint(1, 1)
        .message(4, MessageBuilder::new().varint(1, 2).key(START_GROUP, 9))
        .build();

    let mut recorder = Recorder::new(&[]).with_default(Decision::ParseAsMessage);
    let err = parse(&msg, &mut recorder).err().unwrap();

    assert_eq!(err.kind(), &ErrorKind::UnsupportedWireType(3));
    assert_eq!(err.offset(), 6);
    assert_eq!(err.path(), "4");
}

#[test]
fn test_max_depth() {
    let mut msg = MessageBuilder::new().varint(1, 1);
    for _ in 0..4 {
        msg = MessageBuilder::new().message(1, msg);
    }
    let msg = msg.build();

    let mut recorder = Recorder::new(&[]).with_default(Decision::ParseAsMessage);
    let options = ParseOptions {
        max_depth: Some(5),
        ..Default::default()
    };
    parse_with_options(&msg, options, &mut recorder).unwrap();
    assert_eq!(recorder.fields(), [(1, vec![1], "1:1:1:1:1".into())]);

    let options = ParseOptions {
        max_depth: Some(4),
        ..Default::default()
    };
    let err = parse_with_options(&msg, options, &mut recorder)
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::DepthLimitExceeded(4));
}

#[test]
fn test_max_input_len() {
    let msg = MessageBuilder::new().varint(1, 1).build();
    let mut recorder = Recorder::new(&[]);

    let options = ParseOptions {
        max_input_len: Some(2),
        ..Default::default()
    };
    parse_with_options(&msg, options, &mut recorder).unwrap();

    let options = ParseOptions {
        max_input_len: Some(1),
        ..Default::default()
    };
    let err = parse_with_options(&msg, options, &mut recorder)
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::InputTooLarge { len: 2, limit: 1 });
}

#[test]
fn test_deep_nesting() {
    // Nesting far deeper than would be safe with a recursive parser.
    let depth = 100_000;

    // Payload lengths of each embedded message, from the innermost outwards.
    let mut lens = Vec::with_capacity(depth);
    let mut len = 0;
    for _ in 0..depth {
        lens.push(len);
        len += 1 + encode_varint(len as u64).len();
    }

    let mut body = Vec::with_capacity(len);
    for &len in lens.iter().rev() {
        body.push(0x0a);
        body.extend(encode_varint(len as u64));
    }
    assert_eq!(body.len(), len);

    let mut field_count = 0;
    let mut policy = FnPolicy::new(
        |_, _| Decision::ParseAsMessage,
        |_, _, _, _| field_count += 1,
    );
    let mut parser = Parser::new(&body);
    parser.parse(&mut policy).unwrap();

    assert_eq!(parser.fields_visited(), depth);
    drop(policy);
    assert_eq!(field_count, 0);
}

#[test]
fn test_idempotent() {
    let tx = fee_tx();

    let mut first = fee_decisions();
    parse(&tx, &mut first).unwrap();

    let mut second = fee_decisions();
    parse(&tx, &mut second).unwrap();

    assert_eq!(first.events, second.events);
}

#[test]
fn test_random_input_does_not_panic() {
    let mut rng = fastrand::Rng::with_seed(1234);
    for _ in 0..2000 {
        let len = rng.usize(0..64);
        let buf: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();

        for default in [
            Decision::Skip,
            Decision::CaptureBytes,
            Decision::ParseAsMessage,
        ] {
            let mut recorder = Recorder::new(&[]).with_default(default);
            let _ = parse(&buf, &mut recorder);
        }
    }
}

#[quickcheck]
fn prop_parse_is_deterministic(buf: Vec<u8>) -> bool {
    let run = || {
        let mut recorder = Recorder::new(&[]).with_default(Decision::ParseAsMessage);
        let result = parse(&buf, &mut recorder);
        (result, recorder.events)
    };
    run() == run()
}

#[quickcheck]
fn prop_scalar_fields_round_trip(values: Vec<u64>) -> bool {
    let msg = values
        .iter()
        .enumerate()
        .fold(MessageBuilder::new(), |msg, (i, &value)| {
            msg.varint(i as u64 + 1, value)
        })
        .build();

    let mut decoded = Vec::new();
    let mut policy = FnPolicy::new(
        |_, _| Decision::Skip,
        |_, _, value: &[u8], _| decoded.push(super::varint::varint_from_le_bytes(value)),
    );
    let ok = parse(&msg, &mut policy).is_ok();
    drop(policy);

    ok && decoded == values
}
