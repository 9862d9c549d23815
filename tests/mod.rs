pub mod unfold {
    use ical_tree::parser::{unfold, unfold_bytes};
    use rstest::rstest;

    #[rstest]
    #[case(include_str!("./resources/example.ics"))]
    #[case(include_str!("./resources/outlook.ics"))]
    #[case(include_str!("./resources/allday.ics"))]
    #[case(include_str!("./resources/multiple.ics"))]
    fn idempotent(#[case] input: &str) {
        let once = unfold(input);
        assert_eq!(unfold(&once), once);
        assert!(!once.contains("\r\n ") && !once.contains("\r\n\t"));
    }

    #[test]
    fn multioctet_line_wrapping() {
        assert_eq!(unfold_bytes(b"\xc3\r\n \xbc").as_ref(), "ü".as_bytes());
    }
}

pub mod lexer {
    use ical_tree::{Lexer, parser::TokenKind};
    use itertools::Itertools;

    fn render(input: &str) -> String {
        let lexer = Lexer::new(input);
        let tokens = Lexer::new(input).collect_vec();
        tokens.iter().map(|token| lexer.display(token)).join(" ")
    }

    #[test]
    fn content_line() {
        insta::assert_snapshot!(
            render("DTSTART;TZID=Europe/Berlin:20240101T100000\r\n"),
            @r#""DTSTART" ";" "TZID" "=" "Europe/Ber"... ":" "20240101T1"... CRLF EOF"#
        );
    }

    #[test]
    fn delimiters() {
        insta::assert_snapshot!(
            render("BEGIN:VCALENDAR\r\nBEGIN:VTODO\r\nEND:VCALENDAR"),
            @r#"<BEGIN:VCALENDAR> CRLF "BEGIN" ":" "VTODO" CRLF <END:VCALENDAR> EOF"#
        );
    }

    #[test]
    fn halts_after_error() {
        let tokens = Lexer::new("X;=1:a\r\nY:b\r\n").collect_vec();
        assert!(matches!(
            tokens.last().map(|token| token.kind),
            Some(TokenKind::Error(_))
        ));
        assert_eq!(tokens.len(), 3);
    }
}

pub mod parser {
    use chrono::{TimeDelta, TimeZone};
    use ical_tree::{
        CalendarParser, ParserError, ParserOptions,
        component::Component,
        parse,
        parser::{CancellationFlag, ErrorCategory},
        types::Tz,
    };
    use itertools::Itertools;
    use rstest::rstest;
    use std::fmt::Write;

    fn berlin() -> Tz {
        Tz::Olson(chrono_tz::Europe::Berlin)
    }

    #[test_log::test]
    fn example() {
        let input = include_bytes!("./resources/example.ics");
        let cal = parse(input, Some(Tz::UTC)).unwrap();
        let event = &cal.events[0];
        assert_eq!(event.uid, "1");
        assert_eq!(
            event.dtstart,
            Tz::UTC.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(event.dtend - event.dtstart, TimeDelta::hours(24));
        assert_eq!(event.summary.as_deref(), Some("Test"));
        assert_eq!(cal.calscale, "GREGORIAN");
    }

    #[test_log::test]
    fn outlook() {
        let input = include_bytes!("./resources/outlook.ics");
        let cal = parse(input, Some(Tz::UTC)).unwrap();
        assert_eq!(cal.get_method(), Some("REQUEST"));
        assert_eq!(cal.prodid, "Microsoft Exchange Server 2010");

        let tz = cal.get_timezone("W. Europe Standard Time").unwrap();
        assert_eq!(tz.standards.len(), 1);
        assert_eq!(tz.daylights.len(), 1);
        assert_eq!(
            Option::<chrono_tz::Tz>::from(tz),
            Some(chrono_tz::Europe::Berlin)
        );

        let event = &cal.events[0];
        assert_eq!(event.dtstamp, None);
        assert_eq!(
            event.dtstart,
            berlin().with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
        );
        assert_eq!(event.dtend - event.dtstart, TimeDelta::minutes(90));
        assert_eq!(event.dtstart.timezone(), berlin());
        assert_eq!(
            event.description.as_deref(),
            Some("Agenda for the quarterly planning meeting. Please bring your notes.")
        );
        similar_asserts::assert_eq!(
            event
                .get_named_properties("ATTENDEE")
                .map(ToString::to_string)
                .collect_vec(),
            [
                "ATTENDEE;ROLE=REQ-PARTICIPANT;PARTSTAT=NEEDS-ACTION;RSVP=TRUE;CN=Doe, John:mailto:john@example.com"
            ]
        );
        assert_eq!(event.alarms[0].trigger, "-PT15M");
        assert_eq!(
            cal.get_tzids().into_iter().collect_vec(),
            ["W. Europe Standard Time"]
        );
    }

    #[test]
    fn allday_and_floating() {
        let input = include_bytes!("./resources/allday.ics");
        let cal = parse(input, Some(berlin())).unwrap();
        let [allday, floating] = cal.events.as_slice() else {
            panic!("expected two events, got {}", cal.events.len());
        };
        assert_eq!(
            allday.dtstart,
            berlin().with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(allday.dtend - allday.dtstart, TimeDelta::hours(24));
        assert!(!allday.has_explicit_end());
        assert_eq!(
            floating.dtstart,
            berlin().with_ymd_and_hms(2024, 3, 16, 8, 30, 0).unwrap()
        );
        assert_eq!(floating.dtend - floating.dtstart, TimeDelta::hours(24));
    }

    #[test]
    fn host_zone_by_default() {
        let input = include_bytes!("./resources/allday.ics");
        let cal = parse(input, None).unwrap();
        assert!(cal.events[1].dtstart.timezone().is_local());
    }

    #[test]
    fn multiple() {
        let input = include_bytes!("./resources/multiple.ics");
        let uids = CalendarParser::from_slice(input)
            .unwrap()
            .map(|cal| cal.map(|cal| cal.events[0].uid.clone()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        similar_asserts::assert_eq!(uids, ["a", "b"]);
        assert_eq!(
            parse(input, Some(Tz::UTC)).unwrap_err(),
            ParserError::TooManyComponents
        );
    }

    #[rstest]
    #[case::blank_line(b"\r\n")]
    #[case::text(b"X-TRAILER")]
    #[case::mail_footer(b"--\r\nSent from my phone\r\n")]
    fn trailing_input(#[case] tail: &[u8]) {
        let input = [include_bytes!("./resources/example.ics").as_slice(), tail].concat();
        let cal = parse(&input, Some(Tz::UTC)).unwrap();
        assert_eq!(cal.events[0].uid, "1");
    }

    fn large_calendar(events: usize) -> String {
        let mut input = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//\r\n");
        for i in 0..events {
            write!(
                input,
                "BEGIN:VEVENT\r\nUID:{i}\r\nDTSTAMP:20240101T000000Z\r\nDTSTART:20240101T000000Z\r\nEND:VEVENT\r\n"
            )
            .unwrap();
        }
        input
    }

    #[test]
    fn large_input() {
        let mut input = large_calendar(20_000);
        let valid = format!("{input}END:VCALENDAR\r\n");
        let cal = parse(valid.as_bytes(), Some(Tz::UTC)).unwrap();
        assert_eq!(cal.events.len(), 20_000);
        assert_eq!(cal.events[19_999].uid, "19999");

        // 3 header lines, 5 lines per event, the END of the broken event is its 4th line
        input.push_str("BEGIN:VEVENT\r\nUID:last\r\nDTSTAMP:20240101T000000Z\r\nEND:VEVENT\r\n");
        let err = parse(input.as_bytes(), Some(Tz::UTC)).unwrap_err();
        insta::assert_snapshot!(err, @"line 100007: invalid VEVENT: missing property: DTSTART");
        assert_eq!(err.line(), Some(3 + 20_000 * 5 + 4));
    }

    #[rstest]
    #[case(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//\r\nBEGIN:VEVENT\r\nUID:1\r\nDTSTAMP:20240101T000000Z\r\nDTSTART:20240101T000000Z\r\nDTEND:20240102T000000Z\r\nDURATION:PT1H\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
        ErrorCategory::Validation
    )]
    #[case(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//\r\nBEGIN:VEVENT\r\nDTSTAMP:20240101T000000Z\r\nDTSTART:20240101T000000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
        ErrorCategory::Validation
    )]
    #[case(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//\r\nBEGIN:VEVENT\r\nUID:1\r\nDTSTAMP:20240101T000000Z\r\nDTSTART:yesterday\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
        ErrorCategory::DateResolution
    )]
    #[case(
        "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nBEGIN:VALARM\r\nEND:VEVENT\r\n",
        ErrorCategory::Structural
    )]
    #[case("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n", ErrorCategory::Structural)]
    #[case("BEGIN:VCALENDAR\nVERSION:2.0\n", ErrorCategory::Lexical)]
    #[case("BEGIN:VCALENDAR\r\nX;A=\"1:b\r\n", ErrorCategory::Lexical)]
    fn invalid(#[case] input: &str, #[case] category: ErrorCategory) {
        let err = parse(input.as_bytes(), Some(Tz::UTC)).unwrap_err();
        assert_eq!(err.category(), category, "{err}");
    }

    #[test]
    fn error_messages() {
        let err = parse(
            b"BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//\r\nBEGIN:VEVENT\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
            Some(Tz::UTC),
        )
        .unwrap_err();
        insta::assert_snapshot!(err, @"line 5: invalid VEVENT: missing property: UID");

        let err = parse(b"BEGIN:VCALENDAR\r\nSUMMARY\r\n", Some(Tz::UTC)).unwrap_err();
        insta::assert_snapshot!(
            err,
            @r#"line 2: unexpected character '\r' in content line, expected ";", "," or ":""#
        );

        let err = parse(b"BEGIN:VCALENDAR\r\nSUMMARY;X=1,2\r\n", Some(Tz::UTC)).unwrap_err();
        insta::assert_snapshot!(
            err,
            @r#"line 2: unexpected character '\r' in content line, expected ";", "," or ":""#
        );
    }

    #[test]
    fn cancelled() {
        let input = include_str!("./resources/outlook.ics");
        let flag = CancellationFlag::new();
        let parser = CalendarParser::new(input).with_options(ParserOptions {
            default_tz: Some(Tz::UTC),
            cancellation: Some(flag.clone()),
        });
        flag.cancel();
        assert_eq!(parser.expect_one().unwrap_err(), ParserError::Cancelled);
    }
}
