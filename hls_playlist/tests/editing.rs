use assert_matches::assert_matches;
use hls_playlist::validate::{SingleValueValidator, TagValidator};
use hls_playlist::{
    keys, CustomTag, Descriptor, Error, IndexRange, MediaTime, PantosTag, Playlist, SingleValueParser,
    SingleValueWriter, Tag, TagFamily, TagKind, TagParser, TagRegistry, TagScope, TagWriter, ValueType,
};
use url::Url;

const CUE_OUT: CustomTag = CustomTag::new("scte35", "EXT-X-CUE-OUT", TagScope::MediaSegment, TagKind::SingleValue);
const CUE_IN: CustomTag = CustomTag::new("scte35", "EXT-X-CUE-IN", TagScope::MediaSegment, TagKind::NoValue);

static CUE_OUT_DURATION: SingleValueValidator = SingleValueValidator::new(ValueType::Float);

struct Scte35;

impl TagFamily for Scte35 {
    fn name(&self) -> &'static str {
        "scte35"
    }

    fn descriptor(&self, name: &str) -> Option<Descriptor> {
        [CUE_OUT, CUE_IN]
            .into_iter()
            .find(|tag| tag.name == name)
            .map(Descriptor::Custom)
    }

    fn parser(&self, descriptor: &Descriptor) -> Option<&dyn TagParser> {
        (*descriptor == Descriptor::Custom(CUE_OUT)).then_some(&SingleValueParser as &dyn TagParser)
    }

    fn writer(&self, descriptor: &Descriptor) -> Option<&dyn TagWriter> {
        (*descriptor == Descriptor::Custom(CUE_OUT)).then_some(&SingleValueWriter as &dyn TagWriter)
    }

    fn validator(&self, descriptor: &Descriptor) -> Option<&dyn TagValidator> {
        (*descriptor == Descriptor::Custom(CUE_OUT)).then_some(&CUE_OUT_DURATION as &dyn TagValidator)
    }
}

const AD_BREAK: &str = concat!(
    "#EXTM3U\n",
    "#EXT-X-TARGETDURATION:10\n",
    "#EXT-X-CUE-OUT:30\n",
    "#EXTINF:10,\n",
    "ad.ts\n",
    "#EXT-X-CUE-IN\n",
    "#EXTINF:10,\n",
    "main.ts\n",
    "#EXT-X-ENDLIST\n",
);

const VOD: &str = concat!(
    "#EXTM3U\n",
    "#EXT-X-TARGETDURATION:10\n",
    "#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\",IV=0x0102\n",
    "#EXTINF:9.009,first\n",
    "a.ts\n",
    "#EXTINF:9.009,\n",
    "b.ts\n",
    "#EXT-X-ENDLIST\n",
);

fn url() -> Url {
    Url::parse("https://cdn.example.com/show/index.m3u8").unwrap()
}

fn scte_registry() -> TagRegistry {
    let mut registry = TagRegistry::new();
    registry.register(Scte35);
    registry
}

#[test]
fn custom_family_tags_take_part_in_structure() {
    let registry = scte_registry();
    let playlist = Playlist::parse_str(AD_BREAK, url(), &registry).unwrap();

    let cue_out = playlist.tags().get(2).unwrap();
    assert_eq!(Descriptor::Custom(CUE_OUT), cue_out.descriptor());
    assert_eq!(Some(30.0), cue_out.typed_value::<f64>(keys::VALUE));
    assert_eq!(Descriptor::Custom(CUE_IN), playlist.tags().get(5).unwrap().descriptor());

    let groups = playlist.segment_groups();
    assert_eq!(IndexRange::new(2, 4), groups[0].range);
    assert_eq!(IndexRange::new(5, 7), groups[1].range);
    assert!(playlist.validate(&registry).is_empty());
    assert_eq!(AD_BREAK, playlist.write(&registry).unwrap());
}

#[test]
fn custom_tags_are_unknown_without_their_family() {
    let registry = TagRegistry::new();
    let playlist = Playlist::parse_str(AD_BREAK, url(), &registry).unwrap();
    let cue_out = playlist.tags().get(2).unwrap();
    assert_eq!(Descriptor::Unknown, cue_out.descriptor());
    assert_eq!(Some("EXT-X-CUE-OUT"), cue_out.name());
    assert_eq!("30", cue_out.body());

    assert_eq!(Some(IndexRange::new(0, 2)), playlist.structure().header);
    assert_eq!(AD_BREAK, playlist.write(&registry).unwrap());
}

#[test]
fn edited_custom_tags_use_their_writer() {
    let registry = scte_registry();
    let mut playlist = Playlist::parse_str(AD_BREAK, url(), &registry).unwrap();
    playlist
        .modify(2, |tag| tag.set_value(keys::VALUE, "soon"))
        .unwrap()
        .unwrap();

    assert!(playlist.tags().get(2).unwrap().is_dirty());
    let text = playlist.write(&registry).unwrap();
    assert!(text.contains("\n#EXT-X-CUE-OUT:soon\n"), "{}", text);

    let issues = playlist.validate(&registry);
    assert_eq!(1, issues.len(), "{:?}", issues);
    assert_eq!(Some(2), issues[0].tag_index);

    assert_matches!(playlist.write(&TagRegistry::new()), Err(Error::NoWriterForDirtyTag(_)));
}

#[test]
fn edits_are_written_back() {
    let registry = TagRegistry::new();
    let mut playlist = Playlist::parse_str(VOD, url(), &registry).unwrap();

    playlist
        .modify(2, |tag| tag.set_value(keys::URI, "rotated.bin"))
        .unwrap()
        .unwrap();
    playlist
        .modify(3, |tag| tag.set_value(keys::DURATION, "8"))
        .unwrap()
        .unwrap();
    playlist
        .insert(1, [Tag::new(PantosTag::Version, "3", &registry).unwrap()])
        .unwrap();

    let text = playlist.write(&registry).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!("#EXT-X-VERSION:3", lines[1]);
    assert_eq!("#EXT-X-KEY:METHOD=AES-128,URI=\"rotated.bin\",IV=0x0102", lines[3]);
    assert_eq!("#EXTINF:8,first", lines[4]);
    assert_eq!("#EXTINF:9.009,", lines[6]);

    assert_eq!(MediaTime::new(8, 1), playlist.segment_groups()[0].time_range.duration);
    assert_eq!(MediaTime::new(17009, 1000), playlist.duration());

    let reparsed = Playlist::parse_str(&text, url(), &registry).unwrap();
    assert_eq!(text, reparsed.write(&registry).unwrap());
    assert_eq!(playlist.structure(), reparsed.structure());
}

#[test]
fn transform_rewrites_every_tag() {
    let registry = TagRegistry::new();
    let mut playlist = Playlist::parse_str(VOD, url(), &registry).unwrap();
    playlist.transform(|tag| {
        if tag.is_location() {
            Tag::location(format!("https://origin.example.com/{}", tag.body()))
        } else {
            tag.clone()
        }
    });

    assert_eq!(
        Some("https://origin.example.com/a.ts"),
        playlist.resolve_uri(4).unwrap().as_ref().map(Url::as_str)
    );
    assert_eq!(2, playlist.segment_groups().len());
    assert_eq!(1, playlist.spans().len());
}

#[test]
fn copies_do_not_see_each_others_edits() {
    let registry = TagRegistry::new();
    let original = Playlist::parse_str(VOD, url(), &registry).unwrap();
    let structure = original.structure();

    let mut copy = original.clone();
    copy.delete_range(5..7).unwrap();
    copy.insert(0, [Tag::comment("# copy")]).unwrap();

    assert_eq!(8, original.len());
    assert_eq!(VOD, original.write(&registry).unwrap());
    assert_eq!(*structure, *original.structure());
    assert_eq!(2, original.segment_groups().len());

    assert_eq!(7, copy.len());
    assert_eq!(1, copy.segment_groups().len());
    assert_eq!(Some("# copy"), copy.tags().get(0).map(Tag::body));
}

#[test]
fn out_of_range_edits_fail() {
    let registry = TagRegistry::new();
    let mut playlist = Playlist::parse_str(VOD, url(), &registry).unwrap();
    assert_matches!(playlist.insert(9, [Tag::comment("#")]), Err(Error::IndexOutOfBounds { index: 9, len: 8 }));
    assert_matches!(playlist.delete(8), Err(Error::IndexOutOfBounds { .. }));
    assert_matches!(playlist.delete_range(7..9), Err(Error::IndexOutOfBounds { .. }));
    assert_matches!(playlist.modify(8, |_| ()), Err(Error::IndexOutOfBounds { .. }));
    assert_eq!(8, playlist.len());
}
