//! Successive edits of the WebRTC Extensions config, plus a minimal record.

/// Cross-reference targets of the first edit.
pub const VARIANT1_XREF: [&str; 8] = [
    "html",
    "webidl",
    "webrtc",
    "hr-time",
    "mediacapture-streams",
    "webrtc-stats",
    "infra",
    "dom",
];

/// Cross-reference targets of the third edit.
pub const VARIANT3_XREF: [&str; 5] = [
    "webrtc",
    "hr-time",
    "mediacapture-streams",
    "webrtc-stats",
    "mediacapture-extensions",
];

/// Smallest record that loads.
pub const MINIMAL: &str = r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"] }"#;

/// First edit, written the way the document ships it: a script assigning
/// `respecConfig`.
pub const WEBRTC_EXTENSIONS_SCRIPT: &str = r#"var respecConfig = {
   "group": "webrtc",
    github: {
      repoURL: "https://github.com/w3c/webrtc-extensions/",
      branch: "main"
    },
  latestVersion: null,
    "xref": ["html", "webidl", "webrtc", "hr-time", "mediacapture-streams", "webrtc-stats", "infra", "dom"],
    "specStatus": "ED",
    editors:  [
      // template: { name: "Name", url: "https://example.org/", company: "Org" },
      { name: "Bernard Aboba", company: "Microsoft Corporation",
        w3cid: "65611"
      }
    ],
    formerEditors: [
      { name: "Henrik Boström", company: "Google", w3cid: "96936", retiredDate: "2021-02-01" }
    ],
    authors: [
    ],
    wgPublicList: "public-webrtc",
    otherLinks: [
      {
        key: "Participate",
        data: [
          {
            value: "Mailing list",
            href: "https://lists.w3.org/Archives/Public/public-webrtc/"
          }
        ]
      }
    ],
    localBiblio: {
      "IANA-STUN-6": {
        "title": "STUN Error Codes",
        "href": "https://www.iana.org/assignments/stun-parameters/stun-parameters.xhtml#stun-parameters-6",
        "publisher": "IANA"
      },
      "CRYPTEX": {
        "aliasOf": "RFC9335"
      },
      "RTP-EXT-CAPTURE-TIME": {
        "title": "Absolute Capture Timestamp RTP header extension",
        "href": "https://www.ietf.org/archive/id/draft-ietf-avtcore-abs-capture-time-00.html",
        "authors": [
          "H. Alvestrand"
        ],
        "status": "6 February 2025. Internet Draft (work in progress)",
        "publisher": "IETF"
      }
    }
}
"#;

/// Second edit as a standalone JSON5 record.
pub const WEBRTC_EXTENSIONS_V2: &str = r#"{
  group: "webrtc",
  github: "w3c/webrtc-extensions",
  shortName: "webrtc-extensions",
  specStatus: "ED",
  edDraftURI: "https://w3c.github.io/webrtc-extensions/",
  xref: ["html", "webidl", "webrtc", "hr-time", "mediacapture-streams", "webrtc-stats", "infra", "dom"],
  lint: { "no-unused-dfns": false },
  subjectPrefix: "[webrtc-extensions]",
  wgPublicList: "public-webrtc",
  editors: [
    { name: "Bernard Aboba", company: "Microsoft Corporation", w3cid: 65611 },
  ],
  formerEditors: [
    { name: "Henrik Boström", company: "Google", w3cid: "96936", retiredDate: "2021-02-01" },
  ],
  localBiblio: {
    "IANA-STUN-6": {
      title: "STUN Error Codes",
      href: "https://www.iana.org/assignments/stun-parameters/stun-parameters.xhtml#stun-parameters-6",
      publisher: "IANA",
    },
    CRYPTEX: { aliasOf: "RFC9335" },
  },
}
"#;

/// Third edit, expressed as an override of the earlier ones.
pub const WEBRTC_EXTENSIONS_V3_OVERRIDE: &str = r#"{
  // dropped html, webidl, infra and dom; picked up mediacapture-extensions
  xref: ["webrtc", "hr-time", "mediacapture-streams", "webrtc-stats", "mediacapture-extensions"],
}
"#;
