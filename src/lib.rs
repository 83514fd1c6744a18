pub mod core;
pub mod physical;
pub mod vector;
pub mod fulltext;
pub mod planner;

/*
┌────────────────────────────────────────────────────────────────────────────────────────────┐
│                              CASCADEDB STRUCT ARCHITECTURE                                  │
└────────────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────────── CORE LAYER ─────────────────────────────────────────┐
│                                                                                              │
│  struct Config               trait Transaction              struct DatabaseAvailability     │
│  • storage_path              • is_no_version()               • flag: AtomicBool             │
│  • page_size_bytes           • category()                    • set(bool, reason)            │
│  • df_worker_cap                                              • is_available()               │
│  • docs_per_worker           enum TransactionCategory                                        │
│  • transfer_speed            • ReadOnly | ReadWrite                                          │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── PHYSICAL LAYER ──────────────────────────────────────┐
│                                                                                              │
│  trait PhysicalFile                       struct MmapPhysicalFile                           │
│  • allocate_page()                        • path, mmap, page_size                           │
│  • free_page(id)                          • free_list: Vec<PageId>                          │
│  • attach_page(id, mode)                                                                    │
│  • detach_page(page, keep_cache)          struct PageCache                                   │
│  • get_next_page_id(id)                   • data_page: Option<(PageId, AutoPage)>            │
│                                            • header_page: Option<AutoPage>                   │
│  enum FixMode { ReadOnly, Write, Discardable, NoLatch }                                     │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────────── VECTOR LAYER ───────────────────────────────────────┐
│                                                                                              │
│  struct VectorKey(u32)          struct VectorPage               struct HeaderPage            │
│  • UNDEFINED = u32::MAX         • count: u32                    • version                    │
│                                 • bitmap: Vec<u8>                • object_count               │
│  struct VectorSchema            • blocks: Vec<u8>                • first_key / last_key       │
│  • fields: Vec<FieldSchema>                                      • last_modified              │
│  • block_size                  struct VectorFile                                             │
│                                 • schema, page_manager                                        │
│  enum OpenMode                 • cursor: CursorStack             enum Progress::Treatment     │
│  Read|Search|Update|Batch|Init • availability                    • Ignore | Stop              │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── FULLTEXT LAYER ──────────────────────────────────────┐
│                                                                                              │
│  enum OperatorNode                      trait ScoreCalculator             struct Query       │
│  • Or(Vec<OperatorNode>)                 • initialize()/prepare()         • root              │
│  • AndNot(Box,Box)                       • first_step()/second_step()    • combine_policy     │
│  • Add(Box,Box)                          • copy()                       • expansion_seeds    │
│  • Weight(f64,Box)                                                                          │
│  • TermSingle(TermLeaf)                 struct SearchInformation         struct Frequency     │
│  • TermAnd/TermTf/TermOr(Vec<Field>)     • term_map: TermMap              • document_frequency │
│                                          • doc counts, index_type          • total_term_freq  │
│                                                                           • children: Vec<>   │
│  mod parser  (tea syntax, nom)          mod parallel                                         │
│  • #and-not #and #or #scale              • GetDocumentFrequency                              │
│  • #freetext #wordlist #syn #term        • GetCount / GetResult                              │
│  • #location #end #window                • range-split fork/join                             │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── PLANNER LAYER ───────────────────────────────────────┐
│                                                                                              │
│  enum Table { Distribute{rule}, Replicate }        trait Candidate                          │
│                                                      • generate_sql(env)                      │
│  struct Environment                                 • delay(field, arg)                       │
│  • objects: HashMap<ObjectId, Box<dyn Any>>         • inquiry(target) -> bits                 │
│                                                                                              │
│  mod retrieve / insert / update / delete            enum UnionKind { Cascade, Sort(spec) }   │
│  • per Table-variant planning impls                 struct InPredicate                        │
│                                                      • Subquery | ValueList | VariableArray    │
└──────────────────────────────────────────────────────────────────────────────────────────────┘
*/
